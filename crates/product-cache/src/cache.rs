//! Product cache with per-key single-flight refresh.
//!
//! ```text
//! get(key) ── fresh entry? ──yes──► entry
//!                 │ no
//!                 ▼
//!         refresh in flight? ──yes──► subscribe, await broadcast
//!                 │ no
//!                 ▼
//!         register flight, spawn refresh task ──► fetch ─► decode (blocking pool)
//!                                                   │
//!                        publish entry (on success), broadcast outcome
//! ```
//!
//! The refresh runs in its own task, so a caller that gives up waiting does
//! not cancel it. A failed refresh leaves the previous entry in place.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::entry::{CacheEntry, Freshness};
use crate::error::{CacheError, CacheResult};
use crate::source::ProductSource;
use crate::stats::{CacheStats, CacheStatsSnapshot};

type RefreshOutcome = CacheResult<Arc<CacheEntry>>;

/// Shared handle to the cache. Clones refer to the same state.
#[derive(Clone)]
pub struct ProductCache {
    inner: Arc<Inner>,
}

struct Inner {
    config: CacheConfig,
    source: Arc<dyn ProductSource>,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
    /// Refreshes in progress: key -> sender for the outcome.
    in_flight: Mutex<HashMap<String, broadcast::Sender<RefreshOutcome>>>,
    stats: CacheStats,
}

impl ProductCache {
    pub fn new(config: CacheConfig, source: Arc<dyn ProductSource>) -> Self {
        info!(
            freshness_window_secs = config.freshness_window.as_secs_f64(),
            "Product cache initialized"
        );
        Self {
            inner: Arc::new(Inner {
                config,
                source,
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Return a fresh entry for `key`, refreshing it if needed.
    ///
    /// Concurrent callers for the same expired key share one refresh.
    pub async fn get(&self, key: &str) -> CacheResult<Arc<CacheEntry>> {
        if let Some(entry) = self.fresh_entry(key) {
            CacheStats::bump(&self.inner.stats.hits);
            return Ok(entry);
        }

        let mut rx = {
            let mut in_flight = lock(&self.inner.in_flight);

            // A refresh may have published between the check above and
            // taking the lock; publishing happens under this lock.
            if let Some(entry) = self.fresh_entry(key) {
                CacheStats::bump(&self.inner.stats.hits);
                return Ok(entry);
            }
            CacheStats::bump(&self.inner.stats.misses);

            match in_flight.get(key) {
                Some(tx) => {
                    CacheStats::bump(&self.inner.stats.coalesced);
                    debug!(product = %key, "Joining in-flight refresh");
                    tx.subscribe()
                }
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    in_flight.insert(key.to_string(), tx);
                    self.spawn_refresh(key.to_string());
                    rx
                }
            }
        };

        rx.recv().await.unwrap_or(Err(CacheError::RefreshAborted))
    }

    /// Like [`get`](Self::get), but falls back to the previous entry when
    /// the refresh fails.
    pub async fn get_or_stale(&self, key: &str) -> CacheResult<(Arc<CacheEntry>, Freshness)> {
        match self.get(key).await {
            Ok(entry) => Ok((entry, Freshness::Fresh)),
            Err(err) => match self.peek(key) {
                Some(entry) => {
                    warn!(
                        product = %key,
                        error = %err,
                        age_secs = entry.age().as_secs(),
                        "Refresh failed, serving stale entry"
                    );
                    Ok((entry, Freshness::Stale))
                }
                None => Err(err),
            },
        }
    }

    /// Current entry for `key` regardless of age.
    pub fn peek(&self, key: &str) -> Option<Arc<CacheEntry>> {
        read(&self.inner.entries).get(key).cloned()
    }

    pub fn len(&self) -> usize {
        read(&self.inner.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.inner.stats.snapshot(self.len())
    }

    /// Number of refreshes currently running.
    pub fn in_flight_count(&self) -> usize {
        lock(&self.inner.in_flight).len()
    }

    fn fresh_entry(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.peek(key)
            .filter(|entry| entry.is_fresh(self.inner.config.freshness_window))
    }

    fn spawn_refresh(&self, key: String) {
        let cache = self.clone();
        tokio::spawn(async move {
            let flight = Flight {
                cache: cache.clone(),
                key,
                published: false,
            };
            let outcome = cache.refresh(&flight.key).await;
            flight.publish(outcome);
        });
    }

    async fn refresh(&self, key: &str) -> RefreshOutcome {
        CacheStats::bump(&self.inner.stats.refreshes);
        let start = Instant::now();

        let bytes = self
            .inner
            .source
            .fetch(key)
            .await
            .map_err(CacheError::Fetch)?;
        let fetched_bytes = bytes.len();

        let product_key = key.to_string();
        let message =
            tokio::task::spawn_blocking(move || grib2_parser::decode(&bytes, &product_key))
                .await
                .map_err(|e| CacheError::Join(e.to_string()))??;

        info!(
            product = %key,
            bytes = fetched_bytes,
            points = message.grid.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Refreshed product"
        );
        Ok(Arc::new(CacheEntry::new(key, message)))
    }
}

/// Registration of one running refresh. Dropping it without publishing
/// (the task panicked or the runtime shut down) unregisters the key, which
/// wakes waiters with [`CacheError::RefreshAborted`].
struct Flight {
    cache: ProductCache,
    key: String,
    published: bool,
}

impl Flight {
    fn publish(mut self, outcome: RefreshOutcome) {
        let inner = &self.cache.inner;
        let sender = {
            let mut in_flight = lock(&inner.in_flight);
            match &outcome {
                Ok(entry) => {
                    write(&inner.entries).insert(self.key.clone(), Arc::clone(entry));
                }
                Err(err) => {
                    CacheStats::bump(&inner.stats.refresh_failures);
                    warn!(product = %self.key, error = %err, kind = err.kind(), "Refresh failed");
                }
            }
            in_flight.remove(&self.key)
        };
        self.published = true;

        if let Some(tx) = sender {
            // No receivers left is fine: the entry is already published.
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        if !self.published {
            warn!(product = %self.key, "Refresh abandoned before publishing");
            lock(&self.cache.inner.in_flight).remove(&self.key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
