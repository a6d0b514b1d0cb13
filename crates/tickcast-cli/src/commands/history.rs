use std::time::Instant;

use serde::Serialize;

use tickcast_core::{CacheMode, NormalizeReport, PriceField, PricePoint, Symbol, TradeDate};

use super::{report_warnings, CommandData, CommandResult, Context};
use crate::error::CliError;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub symbol: Symbol,
    pub label: String,
    pub field: PriceField,
    pub first_date: TradeDate,
    pub last_date: TradeDate,
    /// Observations in the full normalized series.
    pub observations: usize,
    pub report: NormalizeReport,
    pub points: Vec<PricePoint>,
}

pub async fn run(
    context: &Context,
    ticker: &str,
    tail: Option<usize>,
) -> Result<CommandResult, CliError> {
    load(context, ticker, tail, CacheMode::Use).await
}

pub(super) async fn load(
    context: &Context,
    ticker: &str,
    tail: Option<usize>,
    mode: CacheMode,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let catalog = context.service.catalog();
    let symbol = catalog.resolve(ticker)?;
    let loaded = context.service.load_series(&symbol, mode).await?;

    let series = &loaded.series;
    let points = match tail {
        Some(count) => series.tail(count).to_vec(),
        None => series.points().to_vec(),
    };
    let view = HistoryView {
        label: display_label(context, &symbol),
        symbol,
        field: context.service.config().field,
        first_date: series.first().date,
        last_date: series.last().date,
        observations: series.len(),
        report: loaded.report,
        points,
    };

    Ok(CommandResult::ok(CommandData::History(view))
        .with_warnings(report_warnings(&loaded.report))
        .with_cache_hit(loaded.cache_hit)
        .with_latency(started))
}

pub(super) fn display_label(context: &Context, symbol: &Symbol) -> String {
    context
        .service
        .catalog()
        .entries()
        .iter()
        .find(|entry| &entry.symbol == symbol)
        .map_or_else(|| symbol.as_str().to_owned(), |entry| entry.label.to_owned())
}
