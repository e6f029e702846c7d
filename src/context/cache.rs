//
//  bitbucket-context
//  context/cache.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # TTL Cache
//!
//! A small expiring key-value store used by the context layer to memoize
//! current-user lookups, recent pull request listings, and per-site API
//! clients.
//!
//! ## Semantics
//!
//! - Expiry is **lazy**: entries are checked at read time and an expired
//!   read evicts the entry as a side effect. There is no background sweep
//!   and no timer task.
//! - [`CacheMap::set_item`] overwrites unconditionally and resets the TTL.
//! - No eviction policy beyond TTL and no capacity bound — the key space
//!   here is per-hostname and a handful of aggregate keys.
//!
//! The time source is injected through the [`Clock`] trait so tests can
//! drive expiry deterministically instead of sleeping.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use bitbucket_context::context::CacheMap;
//!
//! let mut cache: CacheMap<String> = CacheMap::new();
//! cache.set_item("bitbucket.org", "value".to_string(), Duration::from_secs(600));
//! assert_eq!(cache.get_item("bitbucket.org"), Some(&"value".to_string()));
//! assert_eq!(cache.get_item("missing"), None);
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source for cache expiry.
///
/// The default [`SystemClock`] reads `Instant::now()`; tests substitute a
/// manually-advanced clock.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by the real monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

/// Expiring key-value store with lazy, read-time eviction.
pub struct CacheMap<T> {
    entries: HashMap<String, Entry<T>>,
    clock: Arc<dyn Clock>,
}

impl<T> Default for CacheMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheMap<T> {
    /// Creates an empty cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache on the given clock.
    ///
    /// Used by tests to control expiry without wall-clock sleeps.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Stores a value under `key`, expiring `ttl` from now.
    ///
    /// Overwrites any existing entry unconditionally, resetting its TTL.
    pub fn set_item(&mut self, key: impl Into<String>, value: T, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries.insert(key.into(), Entry { value, expires_at });
    }

    /// Reads a value, evicting it first if it has expired.
    ///
    /// # Returns
    ///
    /// `None` for both "never stored" and "stored but expired" — callers
    /// cannot and should not distinguish the two.
    pub fn get_item(&mut self, key: &str) -> Option<&T> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at <= now {
                self.entries.remove(key);
                return None;
            }
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Removes an entry.
    ///
    /// # Returns
    ///
    /// `true` when an entry (expired or not) was present and removed.
    pub fn delete_item(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Live entries as `(key, value)` pairs.
    ///
    /// Expired entries are purged before collection, so a key whose TTL
    /// has elapsed never appears in the result.
    pub fn get_items(&mut self) -> Vec<(String, T)>
    where
        T: Clone,
    {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Number of entries currently stored, expired ones included.
    ///
    /// Only meaningful for diagnostics; reads go through [`get_item`].
    ///
    /// [`get_item`]: CacheMap::get_item
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
