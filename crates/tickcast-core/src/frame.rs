//! Raw tabular price history as delivered by a data source.
//!
//! A [`RawFrame`] is deliberately loose: cells may be numbers, text or
//! missing, and column labels may be simple (`Close`) or grouped
//! (`("Close", "AAPL")`) the way multi-instrument downloads label them. The
//! [`normalize`](crate::normalize) module turns a frame into a [`Series`].

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{PriceField, Series, Symbol};

/// Column label of a raw frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    Simple(String),
    /// Multi-level label; the first level is the base field name.
    Grouped(Vec<String>),
}

impl ColumnLabel {
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple(name.into())
    }

    pub fn grouped<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Grouped(levels.into_iter().map(Into::into).collect())
    }

    /// Base field name with grouping levels flattened away.
    pub fn base(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Grouped(levels) => levels.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped(levels) if levels.len() > 1)
    }

    /// Same label reduced to its base field name.
    pub fn flattened(&self) -> Self {
        Self::Simple(self.base().to_owned())
    }
}

impl Display for ColumnLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple(name) => f.write_str(name),
            Self::Grouped(levels) => write!(f, "({})", levels.join(", ")),
        }
    }
}

/// Single untyped cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build a cell from optional numeric data, mapping `None` to `Missing`.
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// One row: the index cell (date/time) and the value cells in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub index: RawCell,
    pub cells: Vec<RawCell>,
}

impl RawRecord {
    pub fn new(index: impl Into<RawCell>, cells: Vec<RawCell>) -> Self {
        Self {
            index: index.into(),
            cells,
        }
    }

    /// Cell at `column`, treating short rows as missing trailing values.
    pub fn cell(&self, column: usize) -> &RawCell {
        static MISSING: RawCell = RawCell::Missing;
        self.cells.get(column).unwrap_or(&MISSING)
    }
}

/// Raw daily history for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFrame {
    symbol: Symbol,
    index_label: String,
    columns: Vec<ColumnLabel>,
    records: Vec<RawRecord>,
}

impl RawFrame {
    pub fn new(symbol: Symbol, index_label: impl Into<String>, columns: Vec<ColumnLabel>) -> Self {
        Self {
            symbol,
            index_label: index_label.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn with_records(mut self, records: Vec<RawRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn push(&mut self, record: RawRecord) {
        self.records.push(record);
    }

    /// Frame holding a single simple column for `field`, one row per point.
    pub fn from_series(series: &Series, field: PriceField) -> Self {
        let records = series
            .points()
            .iter()
            .map(|point| {
                RawRecord::new(
                    RawCell::text(point.date.format_iso()),
                    vec![point.value.into()],
                )
            })
            .collect();
        Self::new(
            series.symbol().clone(),
            "Date",
            vec![ColumnLabel::simple(field.label())],
        )
        .with_records(records)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of this frame with every grouped label reduced to its base name.
    pub fn flattened(&self) -> Self {
        Self {
            columns: self.columns.iter().map(ColumnLabel::flattened).collect(),
            ..self.clone()
        }
    }
}
