//! Read-Through Cache Module
//!
//! Orchestrates lookups across the memory tier, the remote tier and the
//! origin fetch. Both tiers are populated on the way back up, so the next
//! lookup in this process is a memory hit and the next lookup in any process
//! is a remote hit. Caching is an optimization, never a dependency: every
//! remote-tier failure is logged and treated as a miss, and origin errors
//! propagate without ever being cached.
//!
//! Two concurrent calls for the same cold key may both reach the origin;
//! there is no single-flight collapse, both fills race and the last write
//! wins. Writers treat the cache as eventually consistent.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::memory::MemoryTier;
use crate::cache::policy::TtlPair;
use crate::remote::RemoteCache;

// == Cache Tier ==
/// Which tier served a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Memory,
    Remote,
}

// == Cache Outcome ==
/// A lookup result plus where it came from.
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    /// The listing payload
    pub value: Value,
    /// The tier that answered; None means the origin was consulted
    pub tier: Option<CacheTier>,
}

impl CacheOutcome {
    /// True when either cache tier answered.
    pub fn hit(&self) -> bool {
        self.tier.is_some()
    }
}

// == Read-Through Cache ==
/// Memory -> remote -> origin lookup pipeline.
pub struct ReadThroughCache {
    memory: Arc<RwLock<MemoryTier>>,
    remote: Arc<dyn RemoteCache>,
}

impl ReadThroughCache {
    // == Constructor ==
    pub fn new(memory: Arc<RwLock<MemoryTier>>, remote: Arc<dyn RemoteCache>) -> Self {
        Self { memory, remote }
    }

    /// Shared handle to the memory tier, for the background sweep task.
    pub fn memory_tier(&self) -> Arc<RwLock<MemoryTier>> {
        self.memory.clone()
    }

    // == Get Or Compute ==
    /// Looks `key` up through both tiers, falling back to `compute` (the
    /// origin fetch) on a full miss, and populates both tiers with the
    /// computed result using the TTLs for the query's priority class.
    ///
    /// Only `compute` errors are returned; they are never cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        ttls: TtlPair,
        compute: F,
    ) -> anyhow::Result<CacheOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        // Tier 1: process-local, no I/O.
        if let Some(value) = self.memory.write().await.get(key) {
            debug!(key, "memory tier hit");
            return Ok(CacheOutcome {
                value,
                tier: Some(CacheTier::Memory),
            });
        }

        // Tier 2: shared store. Failures degrade to a miss.
        if let Some(value) = self.remote_lookup(key).await {
            debug!(key, "remote tier hit");
            self.memory
                .write()
                .await
                .set(key.to_string(), value.clone(), ttls.memory_ttl_ms);
            return Ok(CacheOutcome {
                value,
                tier: Some(CacheTier::Remote),
            });
        }

        // Full miss: consult the origin. Errors propagate as-is.
        let value = compute().await?;
        debug!(key, "full miss, computed from origin");

        self.store(key, &value, ttls).await;

        Ok(CacheOutcome { value, tier: None })
    }

    /// Writes a computed value into both tiers, best-effort.
    pub async fn store(&self, key: &str, value: &Value, ttls: TtlPair) {
        match serde_json::to_string(value) {
            Ok(serialized) => {
                if let Err(err) = self
                    .remote
                    .set(key, &serialized, ttls.remote_ttl_secs)
                    .await
                {
                    warn!(key, error = %err, "remote tier populate failed");
                }
            }
            Err(err) => warn!(key, error = %err, "cache payload serialization failed"),
        }

        self.memory
            .write()
            .await
            .set(key.to_string(), value.clone(), ttls.memory_ttl_ms);
    }

    async fn remote_lookup(&self, key: &str) -> Option<Value> {
        let raw = match self.remote.get(key).await {
            Ok(found) => found?,
            Err(err) => {
                warn!(key, error = %err, "remote tier lookup failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "remote tier payload unreadable, treating as miss");
                None
            }
        }
    }
}
