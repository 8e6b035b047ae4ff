//! # Cache Store
//!
//! Key → (value, expiry) map shared by every resolver and the aggregator.
//!
//! - Values are type-erased as `Arc<dyn Any + Send + Sync>` and downcast on
//!   read. Reading a key as the wrong type is a miss.
//! - Expiry is checked lazily on read against the injected [`Clock`]; a read
//!   at or after `expires_at` is a miss and evicts the entry.
//! - Writes are last-writer-wins. Two callers racing on the same miss may
//!   both fetch; both results are equivalent.
//!
//! ## Locking
//!
//! A `parking_lot::RwLock` guards the map. Guards are never held across an
//! `.await`; callers fetch outside the lock and then `set`.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pcae_core::{Clock, SystemClock};
use serde::Serialize;

type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct CacheEntry {
    value: Erased,
    expires_at: DateTime<Utc>,
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.read().len())
            .field("default_ttl", &self.default_ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

impl CacheStore {
    pub fn new(clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// A store on wall-clock time.
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self::new(Arc::new(SystemClock), default_ttl)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up `key` as a `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let now = self.clock.now();
        let found = {
            let entries = self.entries.read();
            entries.get(key).cloned()
        };

        let Some(entry) = found else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if now >= entry.expires_at {
            self.evict_if_expired(key, now);
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key, "cache entry expired");
            return None;
        }

        match entry.value.downcast::<T>() {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "cache entry holds a different type");
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: Arc<T>, ttl: Duration) {
        let expires_at = expiry_after(self.clock.now(), ttl);
        let entry = CacheEntry {
            value: value as Erased,
            expires_at,
        };
        self.entries.write().insert(key.into(), entry);
    }

    /// Store `value` under `key` for the default TTL.
    pub fn insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: Arc<T>) {
        self.set(key, value, self.default_ttl);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop one entry. Returns whether it was present.
    pub fn clear_key(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| now < e.expires_at);
        before - entries.len()
    }

    /// Sorted list of live keys.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(_, e)| now < e.expires_at)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn evict_if_expired(&self, key: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write();
        // Another writer may have refreshed the key since the read.
        if entries.get(key).is_some_and(|e| now >= e.expires_at) {
            entries.remove(key);
        }
    }
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
