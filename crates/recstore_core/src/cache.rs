//! Query cache contract and in-memory implementation.

use parking_lot::RwLock;
use recstore_mapper::Record;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A key-value cache for loaded record snapshots.
///
/// The durable, shared cache server is the deployment's concern; the
/// repository only needs this contract. Keys are query hashes, values are
/// record snapshots, and entries expire after `max_age` seconds. A
/// `max_age` of zero or less - or a `None` value - drops the entry
/// immediately, which is how deleted-to-empty records are evicted.
pub trait QueryCache: Send + Sync {
    /// Returns the cached record for `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Option<Record>;

    /// Stores `value` under `key` for `max_age` seconds.
    ///
    /// `max_age <= 0` or a `None` value removes the entry.
    fn set(&self, key: &str, value: Option<Record>, max_age: i64);
}

struct CacheEntry {
    data: Record,
    expires_at: Instant,
}

/// An in-memory [`QueryCache`].
///
/// Suitable for tests and for cache-enabled single-process deployments.
/// Thread-safe; expired entries are dropped lazily on access.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a live entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl QueryCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Record> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entries);
            self.entries.write().remove(key);
            return None;
        }
        Some(entry.data.clone())
    }

    fn set(&self, key: &str, value: Option<Record>, max_age: i64) {
        let mut entries = self.entries.write();
        match value {
            Some(data) if max_age > 0 => {
                entries.insert(
                    key.to_owned(),
                    CacheEntry {
                        data,
                        expires_at: Instant::now() + Duration::from_secs(max_age as u64),
                    },
                );
            }
            _ => {
                entries.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recstore_mapper::record_from;
    use serde_json::json;

    #[test]
    fn set_then_get() {
        let cache = MemoryCache::new();
        let record = record_from([("k", json!("v"))]);
        cache.set("hash", Some(record.clone()), 600);

        assert_eq!(cache.get("hash"), Some(record));
    }

    #[test]
    fn miss_returns_none() {
        let cache = MemoryCache::new();
        assert!(cache.get("absent").is_none());
    }

    #[test]
    fn zero_or_negative_age_drops_the_entry() {
        let cache = MemoryCache::new();
        let record = record_from([("k", json!("v"))]);
        cache.set("hash", Some(record.clone()), 600);

        cache.set("hash", Some(record.clone()), 0);
        assert!(cache.get("hash").is_none());

        cache.set("hash", Some(record), -1);
        assert!(cache.get("hash").is_none());
    }

    #[test]
    fn storing_none_drops_the_entry() {
        let cache = MemoryCache::new();
        cache.set("hash", Some(record_from([("k", json!("v"))])), 600);

        cache.set("hash", None, 600);
        assert!(cache.get("hash").is_none());
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache.set("hash", Some(record_from([("k", json!("v"))])), 600);

        cache
            .entries
            .write()
            .get_mut("hash")
            .unwrap()
            .expires_at = Instant::now() - Duration::from_secs(1);

        assert!(cache.get("hash").is_none());
        assert!(!cache.contains("hash"));
    }

    #[test]
    fn overwriting_replaces_the_value() {
        let cache = MemoryCache::new();
        cache.set("hash", Some(record_from([("k", json!("old"))])), 600);
        cache.set("hash", Some(record_from([("k", json!("new"))])), 600);

        assert_eq!(cache.get("hash"), Some(record_from([("k", json!("new"))])));
    }
}
