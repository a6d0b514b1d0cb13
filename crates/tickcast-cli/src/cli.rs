//! CLI argument definitions for tickcast.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tickers` | List the instruments that can be forecast |
//! | `history` | Download and normalize daily history |
//! | `forecast` | Forecast future prices with uncertainty bounds |
//! | `session` | Interactive loop that keeps downloaded series cached |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--source` | `yahoo` | Price history source |
//! | `--csv-dir` | `data` | Directory of `<TICKER>.csv` files for `--source csv` |
//! | `--start` | `2015-01-01` | First day of history to use |
//! | `--field` | `close` | Price column to model |
//! | `--timeout-ms` | `10000` | Download timeout in ms |
//! | `--cache-ttl-secs` | none | Expire cached series after this many seconds |
//!
//! # Examples
//!
//! ```bash
//! tickcast forecast AAPL --years 3
//! tickcast --format json --pretty history "Meta (META)" --tail 20
//! tickcast --source csv --csv-dir ./prices forecast TSLA --components
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tickcast_core::{PriceField, SourceId, TradeDate};

/// Stock price forecasts for a fixed set of large-cap tickers.
#[derive(Debug, Parser)]
#[command(
    name = "tickcast",
    author,
    version,
    about = "Download daily prices and forecast them",
    long_about = "tickcast downloads daily price history for a fixed catalog of big-tech \
tickers, cleans it into a validated series and fits an additive trend + seasonality \
model to forecast one to five years ahead.\n\
\n\
Use 'tickcast <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Price history source.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Directory holding `<TICKER>.csv` files (used with `--source csv`).
    #[arg(long, global = true, default_value = "data")]
    pub csv_dir: PathBuf,

    /// First day of history to use (YYYY-MM-DD).
    #[arg(long, global = true, value_parser = parse_trade_date)]
    pub start: Option<TradeDate>,

    /// Price column to model: open, high, low, close, adj-close or volume.
    #[arg(long, global = true, default_value = "close", value_parser = parse_price_field)]
    pub field: PriceField,

    /// Download timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Expire cached series after this many seconds (default: never).
    #[arg(long, global = true)]
    pub cache_ttl_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Text tables and charts for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
}

/// Price history source selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo Finance chart API.
    Yahoo,
    /// Local CSV exports.
    Csv,
}

impl From<SourceSelector> for SourceId {
    fn from(value: SourceSelector) -> Self {
        match value {
            SourceSelector::Yahoo => SourceId::Yahoo,
            SourceSelector::Csv => SourceId::Csv,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the catalog of tickers that can be forecast.
    Tickers,

    /// Show normalized daily history for one ticker.
    ///
    /// # Examples
    ///
    ///   tickcast history AAPL
    ///   tickcast history "Apple (AAPL)" --tail 30
    History(HistoryArgs),

    /// Forecast one ticker one to five years ahead.
    ///
    /// # Examples
    ///
    ///   tickcast forecast NVDA
    ///   tickcast forecast MSFT --years 5 --rows 60 --components
    Forecast(ForecastArgs),

    /// Interactive session reading commands from stdin.
    ///
    /// Commands: forecast <TICKER> [YEARS], history <TICKER>,
    /// refresh <TICKER>, tickers, help, quit.
    Session,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Ticker (AAPL) or catalog label ("Apple (AAPL)").
    pub ticker: String,

    /// Only keep the most recent N observations.
    #[arg(long)]
    pub tail: Option<usize>,
}

/// Arguments for the `forecast` command.
#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Ticker (AAPL) or catalog label ("Apple (AAPL)").
    pub ticker: String,

    /// Years of prediction (1-5).
    #[arg(long, default_value_t = 2)]
    pub years: u32,

    /// Number of future rows shown in table output.
    #[arg(long, default_value_t = 30)]
    pub rows: usize,

    /// Include trend/weekly/yearly component summary.
    #[arg(long, default_value_t = false)]
    pub components: bool,

    /// Download fresh data even if the series is cached.
    #[arg(long, default_value_t = false)]
    pub refresh: bool,
}

fn parse_trade_date(value: &str) -> Result<TradeDate, String> {
    TradeDate::parse(value).map_err(|error| error.to_string())
}

fn parse_price_field(value: &str) -> Result<PriceField, String> {
    value.parse::<PriceField>().map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["tickcast", "forecast", "AAPL"]).expect("parses");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.source, SourceSelector::Yahoo);
        assert_eq!(cli.field, PriceField::Close);
        assert_eq!(cli.timeout_ms, 10_000);
        assert_eq!(cli.start, None);
        assert_eq!(cli.cache_ttl_secs, None);
        match cli.command {
            Command::Forecast(args) => {
                assert_eq!(args.ticker, "AAPL");
                assert_eq!(args.years, 2);
                assert_eq!(args.rows, 30);
                assert!(!args.components);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "tickcast",
            "history",
            "Apple (AAPL)",
            "--tail",
            "5",
            "--format",
            "json",
            "--field",
            "adj-close",
            "--start",
            "2020-03-01",
            "--source",
            "csv",
        ])
        .expect("parses");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.field, PriceField::AdjClose);
        assert_eq!(SourceId::from(cli.source), SourceId::Csv);
        assert_eq!(
            cli.start.map(TradeDate::format_iso).as_deref(),
            Some("2020-03-01")
        );
        assert!(matches!(cli.command, Command::History(HistoryArgs { tail: Some(5), .. })));
    }

    #[test]
    fn malformed_start_and_field_are_rejected() {
        assert!(Cli::try_parse_from(["tickcast", "--start", "03/01/2020", "tickers"]).is_err());
        assert!(Cli::try_parse_from(["tickcast", "--field", "price", "tickers"]).is_err());
    }
}
