//! Directory Service Module
//!
//! The facade the HTTP layer talks to: cached listings on the read side,
//! origin mutations with spawned invalidation fan-out on the write side, and
//! the admin operations for the cache-management dashboard. Constructed once
//! per process with its collaborators injected, so tests can substitute any
//! tier or the origin store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{
    CacheStats, Invalidator, KeyBuilder, MemoryTier, ReadThroughCache, StatsTracker, TtlPolicy,
};
use crate::config::Config;
use crate::error::{DirectoryError, Result};
use crate::models::{ListFilter, NewSiteEntry, SiteEntry, SiteEntryPatch};
use crate::remote::{GuardedRemote, RemoteCache};
use crate::repo::Repository;

// == List Outcome ==
/// A listing plus its cache metadata.
#[derive(Debug, Clone)]
pub struct ListOutcome {
    pub entries: Vec<SiteEntry>,
    pub total: u64,
    /// Whether a cache tier answered (memory or remote)
    pub cache_hit: bool,
    /// Wall-clock time spent producing the listing
    pub timing_ms: u64,
}

// == Cache Overview ==
/// Aggregate cache state for the admin dashboard.
#[derive(Debug, Clone)]
pub struct CacheOverview {
    /// Listing keys currently present in the remote tier
    pub total_keys: usize,
    pub stats: CacheStats,
}

/// What actually gets cached for a listing: the rows plus their total, so a
/// hit never costs a second origin round trip for the count.
#[derive(Debug, Serialize, Deserialize)]
struct ListingPayload {
    entries: Vec<SiteEntry>,
    total: u64,
}

// == Directory Service ==
/// Read-through cached access to the Site Index directory.
pub struct DirectoryService {
    repo: Arc<dyn Repository>,
    remote: Arc<dyn RemoteCache>,
    cache: ReadThroughCache,
    invalidator: Arc<Invalidator>,
    stats: Arc<StatsTracker>,
    keys: KeyBuilder,
    policy: TtlPolicy,
}

impl DirectoryService {
    // == Constructor ==
    /// Wires the service from configuration plus the injected origin store
    /// and remote tier. The remote tier is wrapped in the timeout/circuit
    /// breaker guard here, so callers hand in the bare client.
    pub fn new(config: &Config, repo: Arc<dyn Repository>, remote: Arc<dyn RemoteCache>) -> Self {
        let remote: Arc<dyn RemoteCache> = Arc::new(GuardedRemote::new(
            remote,
            Duration::from_millis(config.remote_timeout_ms),
            config.breaker_threshold,
            Duration::from_millis(config.breaker_cooldown_ms),
        ));
        let memory = Arc::new(RwLock::new(MemoryTier::new(config.memory_capacity)));
        let keys = KeyBuilder::new(config.namespace.clone());

        Self {
            repo,
            cache: ReadThroughCache::new(memory.clone(), remote.clone()),
            invalidator: Arc::new(Invalidator::new(keys.clone(), memory, remote.clone())),
            stats: Arc::new(StatsTracker::new(keys.clone(), remote.clone())),
            remote,
            keys,
            policy: TtlPolicy::from_config(config),
        }
    }

    /// Shared handle to the memory tier, for the background sweep task.
    pub fn memory_tier(&self) -> Arc<RwLock<MemoryTier>> {
        self.cache.memory_tier()
    }

    // == List ==
    /// The read path: cache key from the normalized filter, memory tier,
    /// remote tier, then origin, with TTLs picked by query popularity.
    ///
    /// Search terms below the minimum length skip caching entirely: they go
    /// straight to the origin and nothing is stored in either tier.
    pub async fn list(&self, filter: &ListFilter) -> Result<ListOutcome> {
        let started = Instant::now();

        if !self.policy.is_cacheable(filter) {
            let entries = self.repo.find_many(filter).await?;
            let total = self.repo.count(filter).await?;
            return Ok(ListOutcome {
                entries,
                total,
                cache_hit: false,
                timing_ms: started.elapsed().as_millis() as u64,
            });
        }

        let key = self.keys.list_key(filter);
        let ttls = self.policy.ttls(self.policy.classify(filter));

        let repo = self.repo.clone();
        let fetch_filter = filter.clone();
        let outcome = self
            .cache
            .get_or_compute(&key, ttls, || async move {
                let entries = repo.find_many(&fetch_filter).await?;
                let total = repo.count(&fetch_filter).await?;
                Ok(serde_json::to_value(ListingPayload { entries, total })?)
            })
            .await?;

        let hit = outcome.hit();
        let payload = match serde_json::from_value::<ListingPayload>(outcome.value) {
            Ok(payload) => payload,
            Err(err) if hit => {
                // A cached payload in an unexpected shape degrades to a miss
                // instead of failing the request; the fresh result replaces it.
                warn!(key = %key, error = %err, "cached listing unreadable, refetching from origin");
                let entries = self.repo.find_many(filter).await?;
                let total = self.repo.count(filter).await?;
                let payload = ListingPayload { entries, total };
                if let Ok(value) = serde_json::to_value(&payload) {
                    self.cache.store(&key, &value, ttls).await;
                }
                self.sample(false);
                return Ok(ListOutcome {
                    entries: payload.entries,
                    total: payload.total,
                    cache_hit: false,
                    timing_ms: started.elapsed().as_millis() as u64,
                });
            }
            Err(err) => {
                return Err(DirectoryError::Internal(format!(
                    "listing payload round-trip failed: {}",
                    err
                )))
            }
        };

        self.sample(hit);

        Ok(ListOutcome {
            entries: payload.entries,
            total: payload.total,
            cache_hit: hit,
            timing_ms: started.elapsed().as_millis() as u64,
        })
    }

    // == Create ==
    /// Inserts a row, then fans invalidation out for its key families.
    pub async fn create(&self, new: NewSiteEntry) -> Result<SiteEntry> {
        let created = self.repo.create(new).await?;
        info!(id = created.id, campus = %created.campus, "site entry created");
        self.on_entry_written(None, Some(&created));
        Ok(created)
    }

    // == Update ==
    /// Applies a patch, then fans invalidation out for the old and (when
    /// moved) new key families.
    pub async fn update(&self, id: i64, patch: SiteEntryPatch) -> Result<SiteEntry> {
        let old = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound(id))?;
        let updated = self.repo.update(id, patch).await?;
        info!(id, campus = %updated.campus, "site entry updated");
        self.on_entry_written(Some(&old), Some(&updated));
        Ok(updated)
    }

    // == Delete ==
    /// Removes a row, then fans invalidation out for its key families.
    pub async fn delete(&self, id: i64) -> Result<SiteEntry> {
        let old = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound(id))?;
        let removed = self.repo.delete(old.id).await?;
        info!(id, "site entry deleted");
        self.on_entry_written(Some(&removed), None);
        Ok(removed)
    }

    // == On Entry Written ==
    /// Spawns invalidation fan-out for a committed write. Runs off the
    /// response's critical path; the returned handle exists for tests and
    /// observability, callers on the request path drop it.
    pub fn on_entry_written(
        &self,
        old: Option<&SiteEntry>,
        new: Option<&SiteEntry>,
    ) -> JoinHandle<usize> {
        let mut touched: Vec<(String, String)> = Vec::new();
        for entry in [old, new].into_iter().flatten() {
            let pair = (entry.campus.clone(), entry.letter.clone());
            if !touched.contains(&pair) {
                touched.push(pair);
            }
        }

        let invalidator = self.invalidator.clone();
        tokio::spawn(async move {
            let pairs: Vec<(&str, &str)> = touched
                .iter()
                .map(|(campus, letter)| (campus.as_str(), letter.as_str()))
                .collect();
            invalidator.fan_out(&pairs).await
        })
    }

    // == Cache Stats ==
    /// Aggregate cache state for the admin dashboard. A failing remote tier
    /// reports zero keys rather than an error.
    pub async fn cache_stats(&self) -> CacheOverview {
        let listing_glob = format!("{}:*", self.keys.namespace());
        let stats_prefix = self.keys.stats_prefix();

        let total_keys = match self.remote.keys(&listing_glob).await {
            Ok(keys) => keys
                .iter()
                .filter(|key| !key.starts_with(&stats_prefix))
                .count(),
            Err(err) => {
                warn!(error = %err, "remote key listing failed for cache stats");
                0
            }
        };

        CacheOverview {
            total_keys,
            stats: self.stats.stats().await,
        }
    }

    // == Invalidate Pattern ==
    /// Admin-driven invalidation of an arbitrary key glob within this
    /// service's namespace. Returns the number of remote keys deleted.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        if !pattern.starts_with(self.keys.namespace()) {
            return Err(DirectoryError::InvalidRequest(format!(
                "pattern must start with the '{}' namespace",
                self.keys.namespace()
            )));
        }
        Ok(self.invalidator.purge_glob(pattern).await)
    }

    /// Records a hit/miss sample without blocking the read path.
    fn sample(&self, hit: bool) {
        let stats = self.stats.clone();
        tokio::spawn(async move {
            if hit {
                stats.record_hit().await;
            } else {
                stats.record_miss().await;
            }
        });
    }
}
