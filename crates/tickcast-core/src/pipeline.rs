//! Request pipeline: cache → source → normalizer → forecaster.
//!
//! Each call is an independent request. The only state carried between
//! calls is the explicit [`SeriesCache`] owned by the service.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::cache::{CacheMode, CachedSeries, SeriesCache};
use crate::data_source::{DataSource, HistoryRequest, SourceError, SourceId};
use crate::forecast::{ForecastError, ForecastResult, Forecaster};
use crate::normalize::{normalize_with_report, NormalizeError, NormalizeReport};
use crate::{Catalog, Horizon, PriceField, Series, Symbol, TradeDate, ValidationError};

/// Errors that halt a single request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("data source unavailable: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Per-service request defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub start: TradeDate,
    pub field: PriceField,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let (year, month, day) = HistoryRequest::DEFAULT_START;
        Self {
            start: TradeDate::from_ymd(year, month, day).unwrap_or_else(|_| TradeDate::today()),
            field: PriceField::Close,
        }
    }
}

/// Normalized series returned by [`ForecastService::load_series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedSeries {
    pub series: Series,
    pub report: NormalizeReport,
    pub cache_hit: bool,
    pub source: SourceId,
}

/// Series plus its forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub loaded: LoadedSeries,
    pub forecast: ForecastResult,
    pub model: &'static str,
}

/// Owns the collaborators of one session and runs requests against them.
#[derive(Clone)]
pub struct ForecastService {
    source: Arc<dyn DataSource>,
    forecaster: Arc<dyn Forecaster>,
    cache: SeriesCache,
    catalog: Catalog,
    config: PipelineConfig,
}

impl ForecastService {
    pub fn new(source: Arc<dyn DataSource>, forecaster: Arc<dyn Forecaster>) -> Self {
        Self {
            source,
            forecaster,
            cache: SeriesCache::default(),
            catalog: Catalog::big_tech(),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_cache(mut self, cache: SeriesCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn source_id(&self) -> SourceId {
        self.source.id()
    }

    /// Load the normalized series for `symbol`, honoring `mode`.
    pub async fn load_series(
        &self,
        symbol: &Symbol,
        mode: CacheMode,
    ) -> Result<LoadedSeries, PipelineError> {
        if !self.catalog.contains(symbol) {
            return Err(ValidationError::NotInCatalog {
                symbol: symbol.as_str().to_owned(),
            }
            .into());
        }

        if mode == CacheMode::Use {
            if let Some(cached) = self.cache.get(symbol).await {
                tracing::info!(%symbol, "series cache hit");
                return Ok(LoadedSeries {
                    series: cached.series,
                    report: cached.report,
                    cache_hit: true,
                    source: self.source.id(),
                });
            }
        }

        tracing::info!(%symbol, ?mode, source = %self.source.id(), "series cache miss");
        let request = HistoryRequest::starting(symbol.clone(), self.config.start);
        let frame = self.source.history(request).await?;
        let (series, report) = normalize_with_report(&frame, self.config.field)?;

        let series = series
            .since(self.config.start)
            .ok_or_else(|| NormalizeError::NoUsableData {
                symbol: symbol.clone(),
                field: self.config.field,
                rows_seen: report.rows_seen,
            })?;

        if mode != CacheMode::Bypass {
            self.cache
                .put(CachedSeries {
                    series: series.clone(),
                    report,
                })
                .await;
        }

        Ok(LoadedSeries {
            series,
            report,
            cache_hit: false,
            source: self.source.id(),
        })
    }

    /// Load `symbol` and forecast `horizon` beyond its last observation.
    pub async fn forecast(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
        mode: CacheMode,
    ) -> Result<ForecastReport, PipelineError> {
        let loaded = self.load_series(symbol, mode).await?;
        let forecast = self.forecaster.forecast(&loaded.series, horizon)?;
        tracing::info!(
            %symbol,
            %horizon,
            points = forecast.points.len(),
            model = self.forecaster.name(),
            "forecast complete"
        );

        Ok(ForecastReport {
            loaded,
            forecast,
            model: self.forecaster.name(),
        })
    }
}
