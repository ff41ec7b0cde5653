//! Fetching forecast CSV over HTTP, with a short lived in-memory cache of parsed
//! results keyed by source.

use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lru::LruCache;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::data::forecast_record::{ForecastRecord, ForecastRecordCollection};
use crate::error::ForecastError;

const DEFAULT_CACHE_CAPACITY: usize = 64;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Parsed records kept per source, bounded by entry count. Entries are never
/// modified once stored; a later insert for the same key replaces the whole entry.
pub struct ForecastCache {
    entries: RwLock<LruCache<String, CachedForecast>>,
    ttl: Duration,
}

struct CachedForecast {
    records: Arc<[ForecastRecord]>,
    inserted_at: Instant,
}

impl CachedForecast {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        ForecastCache::with_capacity(DEFAULT_CACHE_CAPACITY, ttl)
    }

    /// A cache holding at most `capacity` sources; the least recently used is
    /// dropped first. A zero capacity is treated as one.
    pub fn with_capacity(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ForecastCache {
            entries: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<[ForecastRecord]>> {
        // LruCache::get bumps recency, so even reads take the write lock
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let lookup = entries
            .get(key)
            .map(|entry| (!entry.is_expired(self.ttl)).then(|| entry.records.clone()));
        match lookup {
            Some(Some(records)) => Some(records),
            Some(None) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &str, records: Arc<[ForecastRecord]>) {
        let entry = CachedForecast {
            records,
            inserted_at: Instant::now(),
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "evicted expired forecasts");
        }
        entries.put(key.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).cap().get()
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        ForecastCache::new(DEFAULT_CACHE_TTL)
    }
}

/// Fetches the forecast CSV at `url` and runs the pipeline over it.
///
/// Results are served from `cache` while fresh. A run that produced diagnostics is
/// returned but not cached.
pub async fn fetch_forecast(
    client: &Client,
    url: &str,
    config: &PipelineConfig,
    cache: &ForecastCache,
) -> Result<Arc<[ForecastRecord]>, ForecastError> {
    fetch_forecast_at(client, url, config, cache, Utc::now()).await
}

/// Like [`fetch_forecast`], resolving any rolling window against `now`
#[instrument(skip(client, config, cache))]
pub async fn fetch_forecast_at(
    client: &Client,
    url: &str,
    config: &PipelineConfig,
    cache: &ForecastCache,
    now: DateTime<Utc>,
) -> Result<Arc<[ForecastRecord]>, ForecastError> {
    let key = format!("{url}#{}", config.cache_key(&now));
    if let Some(records) = cache.get(&key) {
        debug!(count = records.len(), "forecast cache hit");
        return Ok(records);
    }
    debug!("forecast cache miss");

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ForecastError::Status(response.status().as_u16()));
    }
    let text = response.text().await?;

    let outcome = ForecastRecordCollection::from_data(&text).records_at(config, &now);
    let records: Arc<[ForecastRecord]> = outcome.records.into();

    if outcome.diagnostics.is_empty() {
        cache.insert(&key, records.clone());
    } else {
        for diagnostic in &outcome.diagnostics {
            warn!(%diagnostic, "forecast data not usable");
        }
    }

    info!(count = records.len(), "parsed forecast");
    Ok(records)
}
