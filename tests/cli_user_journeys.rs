//! Behavior-driven tests for CLI user journeys
//!
//! These tests run the `tickcast` binary against local CSV fixtures and check
//! what the user sees: JSON envelopes, tables and exit codes.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn write_prices(dir: &Path, ticker: &str, days: usize) {
    let mut body = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    let start = time::macros::date!(2023 - 01 - 02);
    let mut written = 0;
    let mut offset = 0_i64;
    while written < days {
        let date = start + time::Duration::days(offset);
        offset += 1;
        if matches!(date.weekday(), time::Weekday::Saturday | time::Weekday::Sunday) {
            continue;
        }
        let close = 150.0 + written as f64 * 0.3 + (written % 5) as f64;
        body.push_str(&format!(
            "{date},{o:.2},{h:.2},{l:.2},{close:.2},{close:.2},1000000\n",
            o = close - 1.0,
            h = close + 1.5,
            l = close - 2.0,
        ));
        written += 1;
    }
    // A row the normalizer must drop.
    body.push_str("2023-01-03,1,1,1,NaN,NaN,0\n");
    std::fs::write(dir.join(format!("{ticker}.csv")), body).expect("write fixture");
}

fn fixture_dir() -> TempDir {
    let dir = tempdir().expect("temp dir");
    write_prices(dir.path(), "AAPL", 120);
    write_prices(dir.path(), "MSFT", 40);
    dir
}

fn tickcast(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tickcast"))
        .args(["--source", "csv", "--csv-dir"])
        .arg(dir)
        .args(["--start", "2023-01-01"])
        .args(args)
        .env("TICKCAST_LOG", "off")
        .output()
        .expect("binary runs")
}

fn json_stdout(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is one JSON envelope")
}

// =============================================================================
// CLI User Journey: Browsing the catalog
// =============================================================================

#[test]
fn user_can_list_the_tickers_available_for_forecasting() {
    // Given: any configuration
    let dir = fixture_dir();

    // When: the user lists tickers as JSON
    let envelope = json_stdout(&tickcast(dir.path(), &["--format", "json", "tickers"]));

    // Then: the seven catalog entries are returned in display order
    let symbols = envelope["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["symbol"].as_str().expect("symbol").to_owned())
        .collect::<Vec<_>>();
    assert_eq!(symbols, ["AAPL", "GOOG", "MSFT", "AMZN", "META", "NVDA", "TSLA"]);
    assert_eq!(envelope["data"][0]["label"], "Apple (AAPL)");

    // And: the envelope carries request metadata
    assert_eq!(envelope["meta"]["source"], "csv");
    assert!(envelope["meta"]["request_id"].as_str().is_some());
    assert!(envelope["meta"]["generated_at"].as_str().is_some());
}

// =============================================================================
// CLI User Journey: Historical prices
// =============================================================================

#[test]
fn user_sees_clean_history_with_a_warning_about_dropped_rows() {
    let dir = fixture_dir();

    let envelope = json_stdout(&tickcast(
        dir.path(),
        &["--format", "json", "history", "Apple (AAPL)", "--tail", "5"],
    ));

    let data = &envelope["data"];
    assert_eq!(data["symbol"], "AAPL");
    assert_eq!(data["observations"], 120);
    assert_eq!(data["points"].as_array().expect("array").len(), 5);
    assert_eq!(data["report"]["duplicates_dropped"], 0);
    assert_eq!(data["report"]["invalid_values"], 1);
    let warnings = envelope["meta"]["warnings"].as_array().expect("warnings");
    assert!(warnings[0].as_str().expect("text").contains("1 of 121 rows dropped"));
}

#[test]
fn user_sees_a_text_chart_in_table_mode() {
    let dir = fixture_dir();

    let output = tickcast(dir.path(), &["history", "aapl"]);

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf-8");
    assert!(text.starts_with("Apple (AAPL) daily Close"));
    assert!(text.contains('*'));
    assert!(text.contains("(110 earlier rows not shown)"));
    assert!(text.contains("source: csv"));
}

// =============================================================================
// CLI User Journey: Forecasting
// =============================================================================

#[test]
fn user_gets_one_prediction_per_future_day() {
    // Given: four months of prices on disk
    let dir = fixture_dir();

    // When: forecasting one year with components
    let envelope = json_stdout(&tickcast(
        dir.path(),
        &["--format", "json", "forecast", "AAPL", "--years", "1", "--components"],
    ));

    // Then: 365 future rows, all after the last observation, bounds ordered
    let data = &envelope["data"];
    let future = data["future"].as_array().expect("array");
    assert_eq!(future.len(), 365);
    assert_eq!(data["periods"], 365);
    assert_eq!(data["model"], "additive");
    let last_observed = data["last_observed"].as_str().expect("date");
    for row in future {
        assert!(row["date"].as_str().expect("date") > last_observed);
        let lower = row["yhat_lower"].as_f64().expect("number");
        let yhat = row["yhat"].as_f64().expect("number");
        let upper = row["yhat_upper"].as_f64().expect("number");
        assert!(lower <= yhat && yhat <= upper);
    }
    assert_eq!(data["components"]["weekly"].as_array().expect("weekly").len(), 7);

    // And: trading-day history still gives sane values on weekends
    let max_close = 150.0 + 119.0 * 0.3 + 4.0;
    let spread = max_close - 150.0;
    for row in future {
        let yhat = row["yhat"].as_f64().expect("number");
        assert!(yhat.abs() < 10.0 * max_close, "{row}");
        assert!(row["weekly"].as_f64().expect("number").abs() <= spread, "{row}");
    }
    for effect in data["components"]["weekly"].as_array().expect("weekly") {
        assert!(effect["effect"].as_f64().expect("number").abs() <= spread, "{effect}");
    }
}

#[test]
fn forecast_table_shows_the_requested_number_of_rows() {
    let dir = fixture_dir();

    let output = tickcast(dir.path(), &["forecast", "MSFT", "--rows", "12"]);

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf-8");
    assert!(text.contains("Microsoft (MSFT) 2-year forecast"));
    assert!(text.contains("(showing 12 of 730 future days)"));
}

// =============================================================================
// CLI User Journey: Failures
// =============================================================================

#[test]
fn tickers_outside_the_catalog_are_rejected_with_exit_code_2() {
    let dir = fixture_dir();

    let output = tickcast(dir.path(), &["forecast", "IBM"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not in the configured catalog"));
}

#[test]
fn out_of_range_horizon_is_rejected_with_exit_code_2() {
    let dir = fixture_dir();
    let output = tickcast(dir.path(), &["forecast", "AAPL", "--years", "6"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_data_reports_source_unavailable_with_exit_code_3() {
    let dir = fixture_dir();

    let output = tickcast(dir.path(), &["history", "TSLA"]);

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("source.unavailable"));
}

#[test]
fn unusable_data_reports_exit_code_4() {
    let dir = fixture_dir();
    std::fs::write(
        dir.path().join("NVDA.csv"),
        "Date,Close\n2024-01-02,NaN\nnot-a-date,10\n",
    )
    .expect("write fixture");

    let output = tickcast(dir.path(), &["forecast", "NVDA"]);

    assert_eq!(output.status.code(), Some(4));
}

// =============================================================================
// CLI User Journey: Interactive session
// =============================================================================

#[test]
fn session_serves_repeated_requests_from_the_cache() {
    // Given: a session fed several commands on stdin
    let dir = fixture_dir();
    let mut child = Command::new(env!("CARGO_BIN_EXE_tickcast"))
        .args(["--source", "csv", "--csv-dir"])
        .arg(dir.path())
        .args(["--start", "2023-01-01", "--format", "json", "session"])
        .env("TICKCAST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("session starts");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"history AAPL 3\nbogus\nforecast Apple (AAPL) 1\nrefresh AAPL\nquit\nhistory MSFT\n")
        .expect("write commands");
    let output = child.wait_with_output().expect("session ends");

    // Then: one envelope per successful command, stopping at quit
    assert!(output.status.success());
    let envelopes = String::from_utf8(output.stdout)
        .expect("utf-8")
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).expect("json line"))
        .collect::<Vec<_>>();
    assert_eq!(envelopes.len(), 3);

    // And: the second request for AAPL is a cache hit, refresh is not
    let hits = envelopes
        .iter()
        .map(|envelope| envelope["meta"]["cache_hit"].as_bool().expect("bool"))
        .collect::<Vec<_>>();
    assert_eq!(hits, [false, true, false]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown command 'bogus'"));
}
