use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use tickcast_core::SourceId;

/// Request identifier (UUID v4) for correlating output with logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Envelope metadata emitted with every command result.
///
/// Field order is fixed to keep JSON output stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub generated_at: String,
    pub source: SourceId,
    pub cache_hit: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(source: SourceId, latency_ms: u64, cache_hit: bool) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            generated_at: now_rfc3339(),
            source,
            cache_hit,
            latency_ms,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Output wrapper: `{ "meta": {...}, "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub meta: Metadata,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(meta: Metadata, data: T) -> Self {
        Self { meta, data }
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
