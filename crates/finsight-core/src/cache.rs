//! Response cache for advisor answers
//!
//! Memoizes AI responses for a bounded time window to keep repeat questions
//! from burning provider quota. Entries expire lazily: a lookup past the TTL
//! removes the entry and reports a miss. There is no background sweep.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// How long a cached response stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Composite cache key: session identity, hash of the normalized query, and
/// the sorted set of context-source names that fed the prompt.
///
/// Two sessions asking the same question get separate entries, as do the same
/// session with different data permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(identity: &str, query: &str, context_sources: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query.trim().as_bytes());
        let query_hash = hex::encode(hasher.finalize());

        let mut sources: Vec<&str> = context_sources.to_vec();
        sources.sort_unstable();

        CacheKey(format!("{}:{}:{}", identity, query_hash, sources.join("_")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Operational readout for the cache admin endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cache_size: usize,
    pub cache_duration_minutes: u64,
    /// Up to 10 sample keys, for debugging.
    pub cached_queries: Vec<String>,
}

/// Process-wide response cache.
///
/// Constructed once and shared behind an `Arc` in server state; the interior
/// mutex is held only for map operations, never across an await point.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, String)>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a cached response, evicting it if the TTL has elapsed.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some((stored_at, response)) if now.duration_since(*stored_at) < self.ttl => {
                debug!(key = key.as_str(), "Returning cached response");
                Some(response.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a response under the given key, replacing any previous value.
    pub fn put(&self, key: CacheKey, response: String) {
        self.put_at(key, response, Instant::now());
    }

    fn put_at(&self, key: CacheKey, response: String, now: Instant) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(key, (now, response));
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let removed = entries.len();
        entries.clear();
        info!(removed, "Response cache cleared");
        removed
    }

    pub fn status(&self) -> CacheStatus {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        CacheStatus {
            cache_size: entries.len(),
            cache_duration_minutes: self.ttl.as_secs() / 60,
            cached_queries: entries
                .keys()
                .take(10)
                .map(|k| k.as_str().to_string())
                .collect(),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
