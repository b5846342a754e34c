//! Cache Entry Module
//!
//! Defines the structure for individual memory-tier entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// A single memory-tier entry.
///
/// Unlike the remote tier, which evicts on its own, memory entries carry an
/// absolute expiry and a hit counter; the counter decides who gets evicted
/// when the tier is full.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached listing payload
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Number of times this entry has been served
    pub hit_count: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_ms` from now.
    pub fn new(value: Value, ttl_ms: u64) -> Self {
        Self {
            value,
            expires_at: current_timestamp_ms() + ttl_ms,
            hit_count: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches the expiration
    /// time, so a zero TTL produces an entry that is never served.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
