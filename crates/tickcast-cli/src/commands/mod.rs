mod forecast;
mod history;
mod session;
mod tickers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use tickcast_core::{
    AdditiveForecaster, CacheMode, CsvFileSource, DataSource, EvictionPolicy, ForecastService,
    NormalizeReport, PipelineConfig, SeriesCache, SourceId, YahooAdapter,
};

use crate::cli::{Cli, Command, OutputFormat, SourceSelector};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};
use crate::output;

pub use forecast::{ComponentSummary, ForecastOptions, ForecastView};
pub use history::HistoryView;
pub use tickers::TickerRow;

/// Typed payload of one command, rendered as JSON or as a table.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandData {
    Tickers(Vec<TickerRow>),
    History(HistoryView),
    Forecast(ForecastView),
}

pub struct CommandResult {
    pub data: CommandData,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
    pub cache_hit: bool,
}

impl CommandResult {
    pub fn ok(data: CommandData) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            latency_ms: 0,
            cache_hit: false,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_latency(mut self, started: Instant) -> Self {
        self.latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }
}

/// Everything a command needs to run; shared across a whole session.
pub struct Context {
    pub service: ForecastService,
    pub format: OutputFormat,
    pub pretty: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        let source: Arc<dyn DataSource> = match cli.source {
            SourceSelector::Yahoo => {
                Arc::new(YahooAdapter::default().with_timeout_ms(cli.timeout_ms))
            }
            SourceSelector::Csv => Arc::new(CsvFileSource::new(cli.csv_dir.clone())),
        };
        let policy = cli
            .cache_ttl_secs
            .map_or(EvictionPolicy::Never, |secs| {
                EvictionPolicy::After(Duration::from_secs(secs))
            });

        let mut config = PipelineConfig {
            field: cli.field,
            ..PipelineConfig::default()
        };
        if let Some(start) = cli.start {
            config.start = start;
        }
        tracing::debug!(source = %SourceId::from(cli.source), start = %config.start, field = %config.field, "building forecast service");

        let service = ForecastService::new(source, Arc::new(AdditiveForecaster::default()))
            .with_cache(SeriesCache::new(policy))
            .with_config(config);

        Self {
            service,
            format: cli.format,
            pretty: cli.pretty,
        }
    }

    pub fn emit(&self, result: CommandResult) -> Result<(), CliError> {
        let CommandResult {
            data,
            warnings,
            latency_ms,
            cache_hit,
        } = result;

        let mut meta = Metadata::new(self.service.source_id(), latency_ms, cache_hit);
        for warning in warnings {
            meta.push_warning(warning);
        }
        output::render(&Envelope::new(meta, data), self.format, self.pretty)
    }
}

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let context = Context::from_cli(cli);

    let result = match &cli.command {
        Command::Tickers => tickers::run(&context),
        Command::History(args) => history::run(&context, &args.ticker, args.tail).await?,
        Command::Forecast(args) => {
            let mode = if args.refresh {
                CacheMode::Refresh
            } else {
                CacheMode::Use
            };
            let options = ForecastOptions {
                rows: args.rows,
                components: args.components,
            };
            forecast::run(&context, &args.ticker, args.years, mode, options).await?
        }
        Command::Session => return session::run(&context).await,
    };

    context.emit(result)
}

/// Human-readable description of rows the normalizer excluded.
pub(crate) fn report_warnings(report: &NormalizeReport) -> Vec<String> {
    if report.rows_dropped() == 0 {
        return Vec::new();
    }
    vec![format!(
        "{} of {} rows dropped ({} unparseable timestamps, {} invalid values, {} duplicate dates)",
        report.rows_dropped(),
        report.rows_seen,
        report.unparseable_timestamps,
        report.invalid_values,
        report.duplicates_dropped
    )]
}
