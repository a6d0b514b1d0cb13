//! Data source trait and request/response types.
//!
//! This module defines the adapter contract (`DataSource`) every price
//! history provider implements. A source returns a loose [`RawFrame`]; the
//! caller normalizes it into a [`Series`](crate::Series).
//!
//! # Example
//!
//! ```rust,ignore
//! use tickcast_core::{normalize, DataSource, HistoryRequest, PriceField, Symbol, YahooAdapter};
//!
//! async fn closing_prices(adapter: &YahooAdapter) -> Result<(), Box<dyn std::error::Error>> {
//!     let request = HistoryRequest::new(Symbol::parse("AAPL")?);
//!     let frame = adapter.history(request).await?;
//!     let series = normalize(&frame, PriceField::Close)?;
//!     println!("{} points, last close {:.2}", series.len(), series.last().value);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{RawFrame, Symbol, TradeDate, ValidationError};

/// Identifier of a concrete data source implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Yahoo,
    Csv,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Csv => "csv",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "csv" => Ok(Self::Csv),
            _ => Err(ValidationError::InvalidSource {
                value: value.to_owned(),
            }),
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Download failed or the upstream has no data for the request.
    Unavailable,
    InvalidRequest,
    Internal,
}

/// Structured data source error. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for daily history downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub start: TradeDate,
    pub end: Option<TradeDate>,
}

impl HistoryRequest {
    /// First trading day requested when the caller does not choose one.
    pub const DEFAULT_START: (i32, u8, u8) = (2015, 1, 1);

    pub fn new(symbol: Symbol) -> Self {
        let (year, month, day) = Self::DEFAULT_START;
        let start = TradeDate::from_ymd(year, month, day).unwrap_or_else(|_| TradeDate::today());
        Self {
            symbol,
            start,
            end: None,
        }
    }

    pub fn starting(symbol: Symbol, start: TradeDate) -> Self {
        Self {
            symbol,
            start,
            end: None,
        }
    }

    pub fn with_end(mut self, end: TradeDate) -> Result<Self, SourceError> {
        if end < self.start {
            return Err(SourceError::invalid_request(format!(
                "history end {end} precedes start {}",
                self.start
            )));
        }
        self.end = Some(end);
        Ok(self)
    }
}

/// Price history source contract.
///
/// Implementations must be `Send + Sync`; the pipeline holds them behind a
/// shared reference across awaits.
pub trait DataSource: Send + Sync {
    /// Returns the source identifier.
    fn id(&self) -> SourceId;

    /// Downloads raw daily history for one instrument.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] with kind [`SourceErrorKind::Unavailable`] when
    /// the download fails or the upstream reports no data.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawFrame, SourceError>> + Send + 'a>>;
}
