use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Symbol, TradeDate, ValidationError};

/// Numeric column of a daily price record that can be projected into a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
    AdjClose,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 6] = [
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::AdjClose,
        Self::Volume,
    ];

    /// Canonical column label as written by daily price exports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::AdjClose => "Adj Close",
            Self::Volume => "Volume",
        }
    }

    /// Match a column label ignoring case, spaces, underscores and dashes.
    pub fn from_label(label: &str) -> Option<Self> {
        let folded = fold_label(label);
        Self::ALL
            .into_iter()
            .find(|field| fold_label(field.label()) == folded)
    }
}

impl Display for PriceField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value).ok_or_else(|| ValidationError::InvalidField {
            value: value.to_owned(),
        })
    }
}

pub(crate) fn fold_label(label: &str) -> String {
    label
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Validated daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPoint")]
pub struct PricePoint {
    pub date: TradeDate,
    pub value: f64,
}

impl PricePoint {
    pub fn new(date: TradeDate, value: f64) -> Result<Self, ValidationError> {
        validate_non_negative("value", value)?;
        Ok(Self { date, value })
    }
}

#[derive(Deserialize)]
struct UncheckedPoint {
    date: TradeDate,
    value: f64,
}

impl TryFrom<UncheckedPoint> for PricePoint {
    type Error = ValidationError;

    fn try_from(point: UncheckedPoint) -> Result<Self, Self::Error> {
        Self::new(point.date, point.value)
    }
}

/// Chronological, gap-tolerant, duplicate-free price history of one instrument.
///
/// Dates are strictly increasing and every value is finite and non-negative.
/// A series is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: Symbol,
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        for point in &points {
            validate_non_negative("value", point.value)?;
        }

        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[0].date >= pair[1].date)
        {
            return Err(ValidationError::UnorderedSeries { index: index + 1 });
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|point| point.value)
    }

    /// Points dated on or after `start`, or `None` when nothing remains.
    pub fn since(&self, start: TradeDate) -> Option<Series> {
        let offset = self.points.partition_point(|point| point.date < start);
        if offset == self.points.len() {
            return None;
        }
        Some(Self {
            symbol: self.symbol.clone(),
            points: self.points[offset..].to_vec(),
        })
    }

    /// The last `count` points (or the whole series when shorter).
    pub fn tail(&self, count: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(count);
        &self.points[start..]
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
