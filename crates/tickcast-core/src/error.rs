use thiserror::Error;

/// Validation and contract errors exposed by `tickcast-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("invalid ticker '{symbol}': {reason}")]
    InvalidSymbol { symbol: String, reason: &'static str },
    #[error("symbol '{symbol}' is not in the configured catalog")]
    NotInCatalog { symbol: String },

    #[error("invalid source '{value}', expected one of yahoo, csv")]
    InvalidSource { value: String },

    #[error("forecast horizon must be between {min} and {max} years, got {value}")]
    HorizonOutOfRange { value: u32, min: u32, max: u32 },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("unknown price field '{value}', expected one of open, high, low, close, adj-close, volume")]
    InvalidField { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("series must contain at least one point")]
    EmptySeries,
    #[error("series dates must be strictly increasing (violated at index {index})")]
    UnorderedSeries { index: usize },
}
