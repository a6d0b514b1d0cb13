//! Forecasting collaborator.
//!
//! A [`Forecaster`] consumes a [`Series`] and a [`Horizon`] and returns a
//! prediction with lower/upper bounds for every historical date and every
//! future day up to the horizon.

mod additive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Horizon, Series, Symbol, TradeDate};

pub use additive::AdditiveForecaster;

/// Forecast model failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("at least {required} observations are required to fit, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },
    #[error("interval width must be strictly between 0 and 1, got {value}")]
    InvalidIntervalWidth { value: f64 },
    #[error("seasonality penalty must be finite and positive, got {value}")]
    InvalidSeasonalityPenalty { value: f64 },
    #[error("model fit is degenerate: {reason}")]
    Degenerate { reason: String },
}

/// Tunables of the additive model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Coverage of the uncertainty interval (0.80 yields 10%/90% bounds).
    pub interval_width: f64,
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    /// Number of Fourier pairs for the yearly cycle.
    pub yearly_order: usize,
    /// Ridge penalty on the seasonal Fourier coefficients.
    pub seasonality_penalty: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            interval_width: 0.80,
            weekly_seasonality: true,
            yearly_seasonality: true,
            yearly_order: 10,
            seasonality_penalty: 1.0,
        }
    }
}

/// One predicted date with its additive components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: TradeDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
}

/// Predictions over the historical range followed by the future horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub symbol: Symbol,
    pub horizon: Horizon,
    pub last_observed: TradeDate,
    pub interval_width: f64,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Points strictly after the last observed date.
    pub fn future(&self) -> &[ForecastPoint] {
        let offset = self
            .points
            .partition_point(|point| point.date <= self.last_observed);
        &self.points[offset..]
    }

    /// Points over the observed range.
    pub fn history(&self) -> &[ForecastPoint] {
        let offset = self
            .points
            .partition_point(|point| point.date <= self.last_observed);
        &self.points[..offset]
    }
}

/// Forecasting model contract.
pub trait Forecaster: Send + Sync {
    /// Short model name used in output metadata.
    fn name(&self) -> &'static str;

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<ForecastResult, ForecastError>;
}
