//! Memory Tier Module
//!
//! Bounded, process-local cache tier: the fastest layer, lost on restart and
//! not shared across instances. Expiry is lazy (checked on read); an optional
//! periodic sweep bounds growth from entries that are written but never read
//! again. When full, the entry with the fewest recorded hits is evicted.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::entry::CacheEntry;

// == Memory Tier ==
/// In-process key-value tier with TTL and least-hit eviction.
///
/// All operations are synchronous and infallible: no I/O happens here.
#[derive(Debug)]
pub struct MemoryTier {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Entries evicted under memory pressure since construction
    evictions: u64,
}

impl MemoryTier {
    // == Constructor ==
    /// Creates a new MemoryTier bounded to `capacity` entries.
    ///
    /// Capacity is sized to the (campus x letter) combination count plus
    /// headroom for cacheable search terms.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            evictions: 0,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An entry whose expiry has passed is removed and reported as a miss.
    /// Live entries have their hit count incremented, which is what keeps
    /// them alive under eviction pressure.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get_mut(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                None
            }
            Some(entry) => {
                entry.hit_count += 1;
                Some(entry.value.clone())
            }
            None => None,
        }
    }

    // == Set ==
    /// Stores a value with the given TTL, overwriting any existing entry.
    ///
    /// When the tier is full and the key is new, the entry with the lowest
    /// hit count is evicted first (ties broken arbitrarily). An overwrite
    /// resets the hit count along with the TTL.
    pub fn set(&mut self, key: String, value: Value, ttl_ms: u64) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(victim) = self.least_hit_key() {
                debug!(key = %victim, "memory tier full, evicting least-hit entry");
                self.entries.remove(&victim);
                self.evictions += 1;
            }
        }

        self.entries.insert(key, CacheEntry::new(value, ttl_ms));
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Remove Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Invalidation fan-out uses this so that stale listings cannot survive
    /// in-process after a write. Returns the number of entries removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Sweep Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn sweep_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries evicted under memory pressure since construction.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Current hit count of an entry, for diagnostics.
    pub fn hit_count(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.hit_count)
    }

    fn least_hit_key(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.hit_count)
            .map(|(key, _)| key.clone())
    }
}
