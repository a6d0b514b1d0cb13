//! # Domain Models
//!
//! Canonical domain types for tickcast.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker |
//! | [`Catalog`] | Fixed allow-list of forecastable instruments |
//! | [`Horizon`] | Forecast horizon in whole years (1..=5) |
//! | [`TradeDate`] | Calendar date of a daily observation |
//! | [`PriceField`] | Column selector (open, close, ...) |
//! | [`PricePoint`] | Validated `(date, value)` pair |
//! | [`Series`] | Sorted, de-duplicated, non-empty price history |
//!
//! All types enforce their invariants at construction time:
//!
//! ```rust
//! use tickcast_core::{PricePoint, TradeDate, ValidationError};
//!
//! let date = TradeDate::parse("2024-01-02").unwrap();
//! assert!(PricePoint::new(date, 100.0).is_ok());
//! assert!(matches!(
//!     PricePoint::new(date, f64::NAN),
//!     Err(ValidationError::NonFiniteValue { .. })
//! ));
//! ```

mod catalog;
mod date;
mod horizon;
mod models;
mod symbol;

pub use catalog::{Catalog, CatalogEntry};
pub use date::TradeDate;
pub use horizon::Horizon;
pub(crate) use models::fold_label;
pub use models::{PriceField, PricePoint, Series};
pub use symbol::Symbol;
