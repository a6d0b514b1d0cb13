use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use tickcast_core::{CacheMode, Horizon};

use super::forecast::{self, ForecastOptions};
use super::{history, tickers, CommandResult, Context};
use crate::error::CliError;

const PROMPT: &str = "tickcast> ";
const REFRESH_TAIL: usize = 10;
const HELP: &str = "\
commands:
  forecast <TICKER> [YEARS]   forecast 1-5 years ahead (default 2)
  history <TICKER> [N]        show history, optionally only the last N days
  refresh <TICKER>            download the series again, replacing the cached copy
  tickers                     list available tickers
  help                        show this message
  quit                        leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Forecast { ticker: String, years: u32 },
    History { ticker: String, tail: Option<usize> },
    Refresh { ticker: String },
    Tickers,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParseError(String);

/// Split `forecast Apple (AAPL) 3` into the ticker words and a trailing number.
fn split_trailing_number<'a>(words: &[&'a str]) -> (String, Option<&'a str>) {
    match words.split_last() {
        Some((last, rest)) if !rest.is_empty() && last.chars().all(|ch| ch.is_ascii_digit()) => {
            (rest.join(" "), Some(*last))
        }
        _ => (words.join(" "), None),
    }
}

fn parse_line(line: &str) -> Result<SessionCommand, ParseError> {
    let words = line.split_whitespace().collect::<Vec<_>>();
    let Some((verb, args)) = words.split_first() else {
        return Ok(SessionCommand::Empty);
    };

    let require_ticker = |ticker: String| {
        if ticker.is_empty() {
            Err(ParseError(format!("'{verb}' needs a ticker")))
        } else {
            Ok(ticker)
        }
    };

    match verb.to_ascii_lowercase().as_str() {
        "forecast" | "f" => {
            let (ticker, years) = split_trailing_number(args);
            let years = match years {
                Some(value) => value
                    .parse::<u32>()
                    .map_err(|_| ParseError(format!("invalid number of years '{value}'")))?,
                None => Horizon::default().as_years(),
            };
            Ok(SessionCommand::Forecast {
                ticker: require_ticker(ticker)?,
                years,
            })
        }
        "history" | "h" => {
            let (ticker, tail) = split_trailing_number(args);
            let tail = tail
                .map(|value| {
                    value
                        .parse::<usize>()
                        .map_err(|_| ParseError(format!("invalid row count '{value}'")))
                })
                .transpose()?;
            Ok(SessionCommand::History {
                ticker: require_ticker(ticker)?,
                tail,
            })
        }
        "refresh" | "r" => Ok(SessionCommand::Refresh {
            ticker: require_ticker(args.join(" "))?,
        }),
        "tickers" | "t" => Ok(SessionCommand::Tickers),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(ParseError(format!(
            "unknown command '{other}', type 'help' for a list"
        ))),
    }
}

async fn execute(
    context: &Context,
    command: SessionCommand,
) -> Result<Option<CommandResult>, CliError> {
    let result = match command {
        SessionCommand::Forecast { ticker, years } => {
            forecast::run(context, &ticker, years, CacheMode::Use, ForecastOptions::default())
                .await?
        }
        SessionCommand::History { ticker, tail } => history::run(context, &ticker, tail).await?,
        SessionCommand::Refresh { ticker } => {
            history::load(context, &ticker, Some(REFRESH_TAIL), CacheMode::Refresh).await?
        }
        SessionCommand::Tickers => tickers::run(context),
        SessionCommand::Help => {
            eprintln!("{HELP}");
            return Ok(None);
        }
        SessionCommand::Quit | SessionCommand::Empty => return Ok(None),
    };
    Ok(Some(result))
}

fn prompt() -> Result<(), CliError> {
    let mut stderr = std::io::stderr();
    stderr.write_all(PROMPT.as_bytes())?;
    stderr.flush()?;
    Ok(())
}

/// Read commands from stdin until `quit` or end of input.
///
/// Failures of a single command are reported and the loop continues; the
/// series cache lives for the whole session.
pub async fn run(context: &Context) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!(source = %context.service.source_id(), "session started");

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => match execute(context, command).await {
                Ok(Some(result)) => context.emit(result)?,
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(code = error.exit_code(), "session command failed");
                    eprintln!("error: {error}");
                }
            },
            Err(ParseError(message)) => eprintln!("error: {message}"),
        }
        prompt()?;
    }

    tracing::info!(cached = context.service.cache().len().await, "session ended");
    Ok(())
}
