use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::data_source::{DataSource, HistoryRequest, SourceError, SourceId};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{ColumnLabel, PriceField, RawCell, RawFrame, RawRecord, TradeDate};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart API adapter for daily history.
///
/// The chart endpoint is keyed by symbol and a `[period1, period2)` window of
/// Unix seconds. The response is mapped onto a frame whose columns carry
/// grouped `(field, SYMBOL)` labels.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(ReqwestHttpClient::default()),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 10_000,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, req: &HistoryRequest) -> String {
        let period1 = req.start.unix_timestamp();
        let period2 = req
            .end
            .unwrap_or_else(TradeDate::today)
            .plus_days(1)
            .map(TradeDate::unix_timestamp)
            .unwrap_or(period1);

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history&includeAdjustedClose=true",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            period1,
            period2,
        )
    }

    async fn fetch_history(&self, req: HistoryRequest) -> Result<RawFrame, SourceError> {
        let endpoint = self.chart_url(&req);
        tracing::info!(symbol = %req.symbol, start = %req.start, "downloading yahoo history");

        let request = HttpRequest::get(endpoint, Duration::from_millis(self.timeout_ms))
            .with_referer("https://finance.yahoo.com/");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("yahoo transport error: {e}")))?;

        if !response.is_success() {
            tracing::warn!(symbol = %req.symbol, status = response.status, "yahoo returned non-success status");
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {} for {}",
                response.status, req.symbol
            )));
        }

        parse_chart_response(&req, &response.body)
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawFrame, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_history(req).await })
    }
}

fn parse_chart_response(req: &HistoryRequest, body: &str) -> Result<RawFrame, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error {
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error for {}: {} ({})",
            req.symbol, error.description, error.code
        )));
    }

    let result = chart_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::unavailable(format!("no chart data for {}", req.symbol)))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let ticker = req.symbol.as_str();
    let columns = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjClose,
        PriceField::Volume,
    ]
    .into_iter()
    .map(|field| ColumnLabel::grouped([field.label(), ticker]))
    .collect();

    let cell = |values: &[Option<f64>], i: usize| RawCell::from_option(values.get(i).copied().flatten());
    let records = timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            let volume = quote.volume.get(i).copied().flatten().map(|v| v as f64);
            RawRecord::new(
                RawCell::Number(ts as f64),
                vec![
                    cell(&quote.open, i),
                    cell(&quote.high, i),
                    cell(&quote.low, i),
                    cell(&quote.close, i),
                    cell(&adjclose, i),
                    RawCell::from_option(volume),
                ],
            )
        })
        .collect::<Vec<_>>();

    tracing::info!(symbol = %req.symbol, rows = records.len(), "yahoo history downloaded");
    Ok(RawFrame::new(req.symbol.clone(), "Date", columns).with_records(records))
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Vec<YahooAdjClose>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
