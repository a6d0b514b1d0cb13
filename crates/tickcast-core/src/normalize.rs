//! Series normalizer.
//!
//! Turns a [`RawFrame`] into a [`Series`]:
//!
//! 1. grouped column labels are flattened to their base field name;
//! 2. the frame is projected onto its index (date) and the selected
//!    [`PriceField`];
//! 3. index cells are coerced to calendar dates, rows that do not parse are
//!    dropped ([`RowErrorKind::UnparseableTimestamp`]);
//! 4. value cells are coerced to finite, non-negative `f64`, rows that fail
//!    are dropped ([`RowErrorKind::InvalidValue`]);
//! 5. rows are sorted by date; for duplicate dates the first occurrence in
//!    input order is kept;
//! 6. an empty result is [`NormalizeError::NoUsableData`].
//!
//! Row-level problems never surface as errors. They are logged at `debug`
//! and counted in the [`NormalizeReport`].

use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::domain::fold_label;
use crate::{PriceField, PricePoint, RawCell, RawFrame, Series, Symbol, TradeDate};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const SPACE_DATETIME: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const SPACE_DATETIME_OFFSET: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);

/// Why a single record was excluded from the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    UnparseableTimestamp,
    InvalidValue,
}

/// Frame-level normalization failure, surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no usable {field} data for {symbol}: {rows_seen} rows, none valid")]
    NoUsableData {
        symbol: Symbol,
        field: PriceField,
        rows_seen: usize,
    },
    #[error("column '{field}' not found for {symbol} (available: {available})")]
    MissingColumn {
        symbol: Symbol,
        field: PriceField,
        available: String,
    },
    #[error("column '{field}' is ambiguous for {symbol}: {matches} columns flatten to it")]
    AmbiguousColumn {
        symbol: Symbol,
        field: PriceField,
        matches: usize,
    },
}

/// Row accounting for one normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub unparseable_timestamps: usize,
    pub invalid_values: usize,
    pub duplicates_dropped: usize,
}

impl NormalizeReport {
    pub fn rows_dropped(&self) -> usize {
        self.unparseable_timestamps + self.invalid_values + self.duplicates_dropped
    }

    fn record(&mut self, kind: RowErrorKind) {
        match kind {
            RowErrorKind::UnparseableTimestamp => self.unparseable_timestamps += 1,
            RowErrorKind::InvalidValue => self.invalid_values += 1,
        }
    }
}

/// Normalize `frame` into a series of `field` values.
pub fn normalize(frame: &RawFrame, field: PriceField) -> Result<Series, NormalizeError> {
    normalize_with_report(frame, field).map(|(series, _)| series)
}

/// Like [`normalize`], also returning how many rows were dropped and why.
pub fn normalize_with_report(
    frame: &RawFrame,
    field: PriceField,
) -> Result<(Series, NormalizeReport), NormalizeError> {
    let column = resolve_column(frame, field)?;
    let mut report = NormalizeReport {
        rows_seen: frame.len(),
        ..NormalizeReport::default()
    };

    let mut rows = Vec::with_capacity(frame.len());
    for (row, record) in frame.records().iter().enumerate() {
        let parsed = parse_date(&record.index)
            .ok_or(RowErrorKind::UnparseableTimestamp)
            .and_then(|date| {
                parse_value(record.cell(column))
                    .and_then(|value| PricePoint::new(date, value).ok())
                    .ok_or(RowErrorKind::InvalidValue)
            });

        match parsed {
            Ok(point) => rows.push(point),
            Err(kind) => {
                tracing::debug!(symbol = %frame.symbol(), row, ?kind, "dropping raw record");
                report.record(kind);
            }
        }
    }

    // Stable sort: among equal dates the earliest input row comes first.
    rows.sort_by_key(|point| point.date);
    let mut points: Vec<PricePoint> = Vec::with_capacity(rows.len());
    for point in rows {
        if points.last().is_some_and(|last| last.date == point.date) {
            report.duplicates_dropped += 1;
            continue;
        }
        points.push(point);
    }
    report.rows_kept = points.len();

    if points.is_empty() {
        return Err(NormalizeError::NoUsableData {
            symbol: frame.symbol().clone(),
            field,
            rows_seen: report.rows_seen,
        });
    }

    if report.rows_dropped() > 0 {
        tracing::debug!(
            symbol = %frame.symbol(),
            kept = report.rows_kept,
            dropped = report.rows_dropped(),
            "normalized series with exclusions"
        );
    }

    let series = Series::new(frame.symbol().clone(), points).map_err(|_| {
        NormalizeError::NoUsableData {
            symbol: frame.symbol().clone(),
            field,
            rows_seen: report.rows_seen,
        }
    })?;
    Ok((series, report))
}

fn resolve_column(frame: &RawFrame, field: PriceField) -> Result<usize, NormalizeError> {
    let wanted = fold_label(field.label());
    let matches = frame
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, label)| fold_label(label.base()) == wanted)
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(NormalizeError::MissingColumn {
            symbol: frame.symbol().clone(),
            field,
            available: frame
                .columns()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }),
        many => Err(NormalizeError::AmbiguousColumn {
            symbol: frame.symbol().clone(),
            field,
            matches: many.len(),
        }),
    }
}

/// Coerce an index cell to a calendar date.
///
/// Numbers (and numeric text) are Unix seconds in UTC. Text may be an ISO
/// date, an RFC 3339 date-time, or `YYYY-MM-DD HH:MM:SS` with an optional
/// `±HH:MM` offset; date-times keep the date of their own offset.
pub fn parse_date(cell: &RawCell) -> Option<TradeDate> {
    match cell {
        RawCell::Number(seconds) => date_from_unix(*seconds),
        RawCell::Text(text) => parse_date_text(text.trim()),
        RawCell::Missing => None,
    }
}

fn parse_date_text(text: &str) -> Option<TradeDate> {
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = Date::parse(text, ISO_DATE) {
        return Some(date.into());
    }
    if let Ok(datetime) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(datetime.date().into());
    }
    if let Ok(datetime) = OffsetDateTime::parse(text, SPACE_DATETIME_OFFSET) {
        return Some(datetime.date().into());
    }
    if let Ok(datetime) = PrimitiveDateTime::parse(text, SPACE_DATETIME) {
        return Some(datetime.date().into());
    }
    text.parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .map(|datetime| datetime.date().into())
}

fn date_from_unix(seconds: f64) -> Option<TradeDate> {
    if !seconds.is_finite() || seconds.fract() != 0.0 {
        return None;
    }
    if seconds.abs() > i64::MAX as f64 {
        return None;
    }
    OffsetDateTime::from_unix_timestamp(seconds as i64)
        .ok()
        .map(|datetime| datetime.date().into())
}

/// Coerce a value cell to `f64`; non-finite and negative values are rejected.
pub fn parse_value(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(value) => *value,
        RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
        RawCell::Missing => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}
