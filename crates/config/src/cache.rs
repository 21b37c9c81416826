//! Memoization of resolved values.
//!
//! Responsibilities:
//! - Remember the outcome of a resolution per physical key, including absence.
//! - Allow explicit overwrite (`store`) and eviction (`evict`).
//!
//! Does NOT handle:
//! - Expiry. Entries live until evicted or cleared.
//! - Default substitution (see resolver.rs).
//!
//! Invariants:
//! - "Never looked up" (`lookup` returns `None`) is distinct from
//!   "looked up, found nothing" (`Some(CacheEntry::Absent)`).
//! - A poisoned lock is recovered; the map is always left in a valid state.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Outcome of a resolution as remembered by the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Found(Value),
    Absent,
}

impl CacheEntry {
    pub fn into_option(self) -> Option<Value> {
        match self {
            CacheEntry::Found(value) => Some(value),
            CacheEntry::Absent => None,
        }
    }
}

impl From<Option<Value>> for CacheEntry {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(value) => CacheEntry::Found(value),
            None => CacheEntry::Absent,
        }
    }
}

/// Unbounded key to [`CacheEntry`] map shared by all calls on a resolver.
#[derive(Debug, Default)]
pub struct ResolverCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
        self.entries().get(key).cloned()
    }

    pub fn store(&self, key: impl Into<String>, entry: CacheEntry) {
        self.entries().insert(key.into(), entry);
    }

    /// Remove `key`. No-op when it was never cached.
    pub fn evict(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
