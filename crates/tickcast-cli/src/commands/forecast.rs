use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use tickcast_core::{
    CacheMode, ForecastPoint, Horizon, NormalizeReport, PriceField, PricePoint, Symbol, TradeDate,
};

use super::history::display_label;
use super::{report_warnings, CommandData, CommandResult, Context};
use crate::error::CliError;

#[derive(Debug, Clone, Serialize)]
pub struct ForecastView {
    pub symbol: Symbol,
    pub label: String,
    pub field: PriceField,
    pub model: &'static str,
    pub years: u32,
    pub periods: usize,
    pub last_observed: TradeDate,
    pub last_value: f64,
    pub interval_width: f64,
    pub observations: usize,
    pub report: NormalizeReport,
    /// Predictions strictly after `last_observed`.
    pub future: Vec<ForecastPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentSummary>,
    #[serde(skip)]
    pub observed: Vec<PricePoint>,
    #[serde(skip)]
    pub table_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSummary {
    pub trend_start: f64,
    pub trend_end: f64,
    pub trend_change_pct: f64,
    /// Mean weekly effect per weekday over the forecast window.
    pub weekly: Vec<SeasonalEffect>,
    /// Mean yearly effect per calendar month over the forecast window.
    pub yearly: Vec<SeasonalEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalEffect {
    pub period: String,
    pub effect: f64,
}

/// Options that only shape presentation.
#[derive(Debug, Clone, Copy)]
pub struct ForecastOptions {
    pub rows: usize,
    pub components: bool,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            rows: 30,
            components: false,
        }
    }
}

pub async fn run(
    context: &Context,
    ticker: &str,
    years: u32,
    mode: CacheMode,
    options: ForecastOptions,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let horizon = Horizon::years(years)?;
    let symbol = context.service.catalog().resolve(ticker)?;

    let report = context.service.forecast(&symbol, horizon, mode).await?;
    let loaded = report.loaded;
    let forecast = report.forecast;
    let future = forecast.future().to_vec();

    let view = ForecastView {
        label: display_label(context, &symbol),
        symbol,
        field: context.service.config().field,
        model: report.model,
        years: horizon.as_years(),
        periods: horizon.periods(),
        last_observed: forecast.last_observed,
        last_value: loaded.series.last().value,
        interval_width: forecast.interval_width,
        observations: loaded.series.len(),
        report: loaded.report,
        components: options
            .components
            .then(|| summarize_components(forecast.history(), &future)),
        future,
        observed: loaded.series.into_points(),
        table_rows: options.rows,
    };

    Ok(CommandResult::ok(CommandData::Forecast(view))
        .with_warnings(report_warnings(&loaded.report))
        .with_cache_hit(loaded.cache_hit)
        .with_latency(started))
}

fn summarize_components(history: &[ForecastPoint], future: &[ForecastPoint]) -> ComponentSummary {
    let trend_start = history.last().or(future.first()).map_or(0.0, |point| point.trend);
    let trend_end = future.last().map_or(trend_start, |point| point.trend);
    let trend_change_pct = if trend_start.abs() > f64::EPSILON {
        (trend_end - trend_start) / trend_start.abs() * 100.0
    } else {
        0.0
    };

    let weekly = mean_by(future, |point| {
        let weekday = point.date.into_inner().weekday();
        (weekday.number_days_from_monday(), weekday.to_string())
    }, |point| point.weekly);
    let yearly = mean_by(future, |point| {
        let month = point.date.into_inner().month();
        (u8::from(month), month.to_string())
    }, |point| point.yearly);

    ComponentSummary {
        trend_start,
        trend_end,
        trend_change_pct,
        weekly,
        yearly,
    }
}

fn mean_by(
    points: &[ForecastPoint],
    key: impl Fn(&ForecastPoint) -> (u8, String),
    value: impl Fn(&ForecastPoint) -> f64,
) -> Vec<SeasonalEffect> {
    let mut groups: BTreeMap<u8, (String, f64, usize)> = BTreeMap::new();
    for point in points {
        let (order, name) = key(point);
        let entry = groups.entry(order).or_insert((name, 0.0, 0));
        entry.1 += value(point);
        entry.2 += 1;
    }
    groups
        .into_values()
        .map(|(period, sum, count)| SeasonalEffect {
            period,
            effect: sum / count as f64,
        })
        .collect()
}
