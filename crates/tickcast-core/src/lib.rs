//! # Tickcast Core
//!
//! Domain types and request pipeline for the tickcast stock forecaster.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Price history sources (Yahoo chart API, local CSV) |
//! | [`cache`] | Series memoization keyed by instrument |
//! | [`data_source`] | Data source trait and request types |
//! | [`domain`] | Symbol, catalog, horizon, dates, series |
//! | [`error`] | Core error types |
//! | [`forecast`] | Forecaster trait and the additive model |
//! | [`frame`] | Raw tabular history as downloaded |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Raw frame → validated series |
//! | [`pipeline`] | Cache/source/normalizer/forecaster orchestration |
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────┐   miss   ┌──────────────┐
//! │ SeriesCache  │─────────▶│ DataSource   │──▶ RawFrame
//! └──────┬───────┘          └──────────────┘        │
//!        │ hit                                      ▼
//!        │                                 ┌──────────────┐
//!        └────────────────────────────────▶│  normalize   │──▶ Series
//!                                          └──────────────┘      │
//!                                                                ▼
//!                                                        ┌──────────────┐
//!                                                        │  Forecaster  │
//!                                                        └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tickcast_core::{
//!     normalize, ColumnLabel, PriceField, RawCell, RawFrame, RawRecord, Symbol,
//! };
//!
//! let frame = RawFrame::new(
//!     Symbol::parse("AAPL").unwrap(),
//!     "Date",
//!     vec![ColumnLabel::grouped(["Close", "AAPL"])],
//! )
//! .with_records(vec![
//!     RawRecord::new("2024-01-04", vec![RawCell::Number(102.0)]),
//!     RawRecord::new("2024-01-02", vec![RawCell::Number(100.0)]),
//!     RawRecord::new("2024-01-03", vec![RawCell::text("NaN")]),
//! ]);
//!
//! let series = normalize(&frame, PriceField::Close).unwrap();
//! assert_eq!(series.len(), 2);
//! assert_eq!(series.first().value, 100.0);
//! ```

pub mod adapters;
pub mod cache;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod frame;
pub mod http_client;
pub mod normalize;
pub mod pipeline;

pub use adapters::{CsvFileSource, YahooAdapter};

pub use cache::{CacheMode, CachedSeries, EvictionPolicy, SeriesCache};

pub use data_source::{DataSource, HistoryRequest, SourceError, SourceErrorKind, SourceId};

pub use domain::{
    Catalog, CatalogEntry, Horizon, PriceField, PricePoint, Series, Symbol, TradeDate,
};

pub use error::ValidationError;

pub use forecast::{
    AdditiveForecaster, ForecastConfig, ForecastError, ForecastPoint, ForecastResult, Forecaster,
};

pub use frame::{ColumnLabel, RawCell, RawFrame, RawRecord};

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use normalize::{normalize, normalize_with_report, NormalizeError, NormalizeReport, RowErrorKind};

pub use pipeline::{ForecastReport, ForecastService, LoadedSeries, PipelineConfig, PipelineError};
