use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::metrics::{CACHE_EVICTIONS, CACHE_HITS, CACHE_MISSES, CACHE_SIZE};
use crate::models::ImagePayload;

// Store size above which a write triggers a cleanup pass
const CLEANUP_THRESHOLD: usize = 100;
// Maximum expired entries removed per pass
const CLEANUP_BATCH: usize = 50;

// The two payload classes sharing the store. JSON endpoint responses and
// proxied images live under disjoint key namespaces, so they never collide.
#[derive(Clone)]
pub enum CachedValue {
    Json(Value),
    Image(ImagePayload),
}

impl CachedValue {
    pub fn into_json(self) -> Option<Value> {
        match self {
            CachedValue::Json(v) => Some(v),
            CachedValue::Image(_) => None,
        }
    }

    pub fn into_image(self) -> Option<ImagePayload> {
        match self {
            CachedValue::Image(img) => Some(img),
            CachedValue::Json(_) => None,
        }
    }
}

// Cache entry with timestamp; ttl is captured at write time so entries of
// different classes expire independently during cleanup
#[derive(Clone)]
struct CacheEntry {
    value: CachedValue,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

// Cache key for a proxied image (hash of the target URL)
pub fn image_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url);
    format!("img:{:x}", hasher.finalize())
}

// Process-wide response cache. Freshness is checked lazily on read; nothing
// expires proactively and the only bound is the opportunistic cleanup pass
// after writes. Concurrent misses on one key are coalesced through a per-key
// gate so the upstream sees a single request.
pub struct Cache {
    store: DashMap<String, CacheEntry>,
    pending: DashMap<String, Arc<Mutex<()>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
            pending: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // Fresh-hit lookup; stale entries are left in place for the writer to
    // overwrite
    fn lookup(&self, key: &str, ttl: Duration) -> Option<CachedValue> {
        let entry = self.store.get(key)?;
        if entry.stored_at.elapsed() < ttl {
            CACHE_HITS.inc();
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn insert(&self, key: &str, value: CachedValue, ttl: Duration) {
        self.store.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
        CACHE_SIZE.set(self.store.len() as f64);
        self.cleanup();
    }

    // Maintenance pass, not LRU: removes entries only because they are
    // already expired, never to make room under a hard cap
    fn cleanup(&self) {
        if self.store.len() <= CLEANUP_THRESHOLD {
            return;
        }

        let mut expired: Vec<(String, Instant)> = self
            .store
            .iter()
            .filter(|e| !e.value().is_fresh())
            .map(|e| (e.key().clone(), e.value().stored_at))
            .collect();
        expired.sort_by_key(|(_, stored_at)| *stored_at);
        expired.truncate(CLEANUP_BATCH);

        let mut removed = 0u64;
        for (key, _) in expired {
            // re-check under the shard lock; a concurrent write may have
            // refreshed the entry since the scan
            if self.store.remove_if(&key, |_, e| !e.is_fresh()).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            CACHE_EVICTIONS.inc_by(removed as f64);
            CACHE_SIZE.set(self.store.len() as f64);
        }
    }

    // Cache hit within ttl, otherwise run the loader and store its result.
    // A loader failure is never cached; the next call retries upstream.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Option<CachedValue>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<CachedValue>>,
    {
        if let Some(value) = self.lookup(key, ttl) {
            return Some(value);
        }

        // coalesce concurrent misses: the first caller through the gate
        // fetches, the rest block here and re-check the store afterwards
        let gate = self
            .pending
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = gate.lock().await;

        if let Some(value) = self.lookup(key, ttl) {
            return Some(value);
        }

        CACHE_MISSES.inc();
        let result = loader().await;
        if let Some(value) = &result {
            self.insert(key, value.clone(), ttl);
        }

        drop(guard);
        self.pending.remove(key);
        result
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
