//! Cache Statistics Module
//!
//! Day-bucketed hit/miss counters kept in the remote tier so every process
//! instance feeds the same dashboard numbers. Purely observational: a failed
//! increment or read is logged and swallowed, never surfaced to a request.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::cache::key::KeyBuilder;
use crate::remote::RemoteCache;

/// Counters survive a few days so yesterday's numbers remain inspectable.
const STATS_TTL_SECS: u64 = 3 * 24 * 3600;

// == Cache Stats ==
/// A day's cache performance numbers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// cached / total, 0 when nothing has been recorded
    pub hit_rate: f64,
    /// Cache-eligible lookups recorded today
    pub total_requests: u64,
    /// Lookups served from a cache tier today
    pub cached_requests: u64,
}

impl CacheStats {
    /// Computes the ratio from raw counters, guarding the empty day.
    pub fn from_counters(hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hit_rate,
            total_requests: total,
            cached_requests: hits,
        }
    }
}

// == Stats Tracker ==
/// Increments and reads the per-day counters.
pub struct StatsTracker {
    keys: KeyBuilder,
    remote: Arc<dyn RemoteCache>,
}

impl StatsTracker {
    // == Constructor ==
    pub fn new(keys: KeyBuilder, remote: Arc<dyn RemoteCache>) -> Self {
        Self { keys, remote }
    }

    // == Record Hit ==
    /// Bumps today's hit counter.
    pub async fn record_hit(&self) {
        self.bump("hits").await;
    }

    // == Record Miss ==
    /// Bumps today's miss counter.
    pub async fn record_miss(&self) {
        self.bump("misses").await;
    }

    // == Stats ==
    /// Reads today's counters and computes the hit rate. Unreadable counters
    /// count as zero.
    pub async fn stats(&self) -> CacheStats {
        let day = today();
        let hits = self.read_counter(&day, "hits").await;
        let misses = self.read_counter(&day, "misses").await;
        CacheStats::from_counters(hits, misses)
    }

    /// Get-increment-set without any compare-and-swap: the remote seam has no
    /// atomic increment, and lost updates in dashboard counters are accepted.
    async fn bump(&self, counter: &str) {
        let key = self.keys.stats_key(&today(), counter);

        let current = match self.remote.get(&key).await {
            Ok(Some(raw)) => raw.parse::<u64>().unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                warn!(key = %key, error = %err, "stats counter read failed, skipping increment");
                return;
            }
        };

        if let Err(err) = self
            .remote
            .set(&key, &(current + 1).to_string(), STATS_TTL_SECS)
            .await
        {
            warn!(key = %key, error = %err, "stats counter write failed");
        }
    }

    async fn read_counter(&self, day: &str, counter: &str) -> u64 {
        let key = self.keys.stats_key(day, counter);
        match self.remote.get(&key).await {
            Ok(Some(raw)) => raw.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                warn!(key = %key, error = %err, "stats counter read failed");
                0
            }
        }
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
