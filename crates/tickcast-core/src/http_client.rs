//! Transport seam under the Yahoo adapter.
//!
//! Downloads are single GETs that return a JSON body; tests swap in a canned
//! [`HttpClient`] instead of going over the network.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// One chart download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Yahoo rejects some cookie-less requests without a finance referer.
    pub referer: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            referer: None,
            timeout,
        }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("request timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u128 },
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("transfer failed: {0}")]
    Transfer(String),
}

pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// reqwest-backed client with a cookie jar shared across downloads.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tickcast/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url).timeout(request.timeout);
            if let Some(referer) = &request.referer {
                builder = builder.header(reqwest::header::REFERER, referer);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| classify(e, request.timeout))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| classify(e, request.timeout))?;
            Ok(HttpResponse::new(status, body))
        })
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout {
            elapsed_ms: timeout.as_millis(),
        }
    } else if error.is_connect() {
        HttpError::Connect(error.to_string())
    } else {
        HttpError::Transfer(error.to_string())
    }
}
