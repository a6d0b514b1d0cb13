mod chart;

use std::io::{self, Write};

use tickcast_core::{PricePoint, TradeDate};

use self::chart::Line;
use crate::cli::OutputFormat;
use crate::commands::{CommandData, ComponentSummary, ForecastView, HistoryView, TickerRow};
use crate::error::CliError;
use crate::metadata::Envelope;

const CHART_WIDTH: usize = 72;
const CHART_HEIGHT: usize = 16;
const HISTORY_TABLE_ROWS: usize = 10;

pub fn render(
    envelope: &Envelope<CommandData>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(&mut out, envelope)?,
    }
    out.flush()?;
    Ok(())
}

fn render_table(out: &mut impl Write, envelope: &Envelope<CommandData>) -> io::Result<()> {
    match &envelope.data {
        CommandData::Tickers(rows) => render_tickers(out, rows)?,
        CommandData::History(view) => render_history(out, view)?,
        CommandData::Forecast(view) => render_forecast(out, view)?,
    }

    let meta = &envelope.meta;
    writeln!(out)?;
    writeln!(
        out,
        "source: {} | cache_hit: {} | latency_ms: {} | request_id: {}",
        meta.source, meta.cache_hit, meta.latency_ms, meta.request_id
    )?;
    for warning in &meta.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}

fn render_tickers(out: &mut impl Write, rows: &[TickerRow]) -> io::Result<()> {
    let width = rows
        .iter()
        .map(|row| row.label.len())
        .max()
        .unwrap_or(0)
        .max("COMPANY".len());
    writeln!(out, "{:<width$}  SYMBOL", "COMPANY")?;
    for row in rows {
        writeln!(out, "{:<width$}  {}", row.label, row.symbol)?;
    }
    Ok(())
}

fn day_points(points: &[PricePoint], origin: TradeDate) -> Vec<(i64, f64)> {
    points
        .iter()
        .map(|point| (point.date.days_since(origin), point.value))
        .collect()
}

fn render_history(out: &mut impl Write, view: &HistoryView) -> io::Result<()> {
    writeln!(
        out,
        "{} daily {} ({} .. {}, {} observations)",
        view.label, view.field, view.first_date, view.last_date, view.observations
    )?;

    if let (Some(first), Some(last)) = (view.points.first(), view.points.last()) {
        let series = day_points(&view.points, first.date);
        let first_label = first.date.format_iso();
        let last_label = last.date.format_iso();
        writeln!(out)?;
        for line in chart::render(
            &[Line {
                glyph: '*',
                points: &series,
            }],
            CHART_WIDTH,
            CHART_HEIGHT,
            (&first_label, &last_label),
        ) {
            writeln!(out, "{line}")?;
        }
    }

    let skip = view.points.len().saturating_sub(HISTORY_TABLE_ROWS);
    writeln!(out)?;
    writeln!(out, "{:<10}  {:>12}", "DATE", view.field.label().to_ascii_uppercase())?;
    for point in &view.points[skip..] {
        writeln!(out, "{:<10}  {:>12.2}", point.date, point.value)?;
    }
    if skip > 0 {
        writeln!(out, "({skip} earlier rows not shown)")?;
    }
    Ok(())
}

fn render_forecast(out: &mut impl Write, view: &ForecastView) -> io::Result<()> {
    writeln!(
        out,
        "{} {}-year forecast of daily {} ({} model, {:.0}% interval)",
        view.label,
        view.years,
        view.field,
        view.model,
        view.interval_width * 100.0
    )?;
    writeln!(
        out,
        "last observed {} = {:.2} ({} observations)",
        view.last_observed, view.last_value, view.observations
    )?;

    if let Some(origin) = view.observed.first().map(|point| point.date) {
        let observed = day_points(&view.observed, origin);
        let project = |value: fn(&tickcast_core::ForecastPoint) -> f64| {
            view.future
                .iter()
                .map(|point| (point.date.days_since(origin), value(point)))
                .collect::<Vec<_>>()
        };
        let lower = project(|point| point.yhat_lower);
        let upper = project(|point| point.yhat_upper);
        let yhat = project(|point| point.yhat);
        let first_label = origin.format_iso();
        let last_label = view
            .future
            .last()
            .map_or(view.last_observed, |point| point.date)
            .format_iso();

        writeln!(out)?;
        let lines = [
            Line {
                glyph: '.',
                points: &lower,
            },
            Line {
                glyph: '.',
                points: &upper,
            },
            Line {
                glyph: '*',
                points: &observed,
            },
            Line {
                glyph: '+',
                points: &yhat,
            },
        ];
        for line in chart::render(&lines, CHART_WIDTH, CHART_HEIGHT, (&first_label, &last_label)) {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{}  * observed  + forecast  . bounds", " ".repeat(10))?;
    }

    let shown = view.table_rows.min(view.future.len());
    writeln!(out)?;
    writeln!(
        out,
        "{:<10}  {:>12}  {:>12}  {:>12}",
        "DATE", "FORECAST", "LOWER", "UPPER"
    )?;
    for point in &view.future[..shown] {
        writeln!(
            out,
            "{:<10}  {:>12.2}  {:>12.2}  {:>12.2}",
            point.date, point.yhat, point.yhat_lower, point.yhat_upper
        )?;
    }
    if view.future.len() > shown {
        writeln!(
            out,
            "(showing {shown} of {} future days)",
            view.future.len()
        )?;
    }

    if let Some(components) = &view.components {
        render_components(out, components)?;
    }
    Ok(())
}

fn render_components(out: &mut impl Write, summary: &ComponentSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "trend: {:.2} -> {:.2} ({:+.1}%)",
        summary.trend_start, summary.trend_end, summary.trend_change_pct
    )?;
    for (title, effects) in [("weekly", &summary.weekly), ("yearly", &summary.yearly)] {
        writeln!(out, "{title}:")?;
        for effect in effects {
            writeln!(out, "  {:<10} {:>+10.3}", effect.period, effect.effect)?;
        }
    }
    Ok(())
}
