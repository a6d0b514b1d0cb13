use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

const LEVEL_VAR: &str = "TICKCAST_LOG";
const FORMAT_VAR: &str = "TICKCAST_LOG_FORMAT";

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// Fails when a subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    match log_format().as_str() {
        "json" => builder.json().finish().try_init(),
        _ => builder.finish().try_init(),
    }
}

fn env_filter() -> EnvFilter {
    let override_level = std::env::var(LEVEL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| std::env::var("RUST_LOG").ok());

    match override_level {
        Some(value) => EnvFilter::new(value),
        None => EnvFilter::new("warn"),
    }
}

fn log_format() -> String {
    std::env::var(FORMAT_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_else(|| String::from("plain"))
}
