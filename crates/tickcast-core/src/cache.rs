//! In-memory memoization of normalized series, keyed by instrument.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{NormalizeReport, Series, Symbol};

/// Defines how a single load interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a live entry is present; otherwise download
    /// and store the result. (Default)
    #[default]
    Use,
    /// Always download, replacing any cached entry.
    Refresh,
    /// Always download; neither read nor write the cache.
    Bypass,
}

/// When cached entries stop being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Entries live for the lifetime of the cache. (Default)
    #[default]
    Never,
    /// Entries expire this long after they were stored.
    After(Duration),
}

/// A normalized series together with the accounting of how it was built.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSeries {
    pub series: Series,
    pub report: NormalizeReport,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedSeries,
    stored_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<Symbol, CacheEntry>,
    policy: EvictionPolicy,
}

impl CacheInner {
    fn is_live(&self, entry: &CacheEntry, now: Instant) -> bool {
        match self.policy {
            EvictionPolicy::Never => true,
            EvictionPolicy::After(ttl) => now.duration_since(entry.stored_at) < ttl,
        }
    }

    fn get(&self, key: &Symbol) -> Option<CachedSeries> {
        let now = Instant::now();
        self.map
            .get(key)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.value.clone())
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        let policy = self.policy;
        self.map.retain(|_, entry| match policy {
            EvictionPolicy::Never => true,
            EvictionPolicy::After(ttl) => now.duration_since(entry.stored_at) < ttl,
        });
    }
}

/// Shareable series cache owned by the caller of the pipeline.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl SeriesCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                policy,
            })),
        }
    }

    /// Cached series for `symbol` if present and not expired.
    pub async fn get(&self, symbol: &Symbol) -> Option<CachedSeries> {
        let store = self.inner.read().await;
        store.get(symbol)
    }

    pub async fn put(&self, value: CachedSeries) {
        let mut store = self.inner.write().await;
        let key = value.series.symbol().clone();
        store.map.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `symbol`, returning whether one existed.
    pub async fn invalidate(&self, symbol: &Symbol) -> bool {
        let mut store = self.inner.write().await;
        store.map.remove(symbol).is_some()
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of stored entries (including expired ones not yet cleared).
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new(EvictionPolicy::Never)
    }
}
