//! Invalidation Module
//!
//! Fans a write out to every cache-key family that could contain the touched
//! row: the (campus, letter) pair of the old row and, when an update moved
//! the row, of the new one too. The memory tier is purged synchronously so
//! this process cannot serve the stale listing again; remote deletes go out
//! in parallel and are best-effort, because partial invalidation beats
//! blocking the write. Callers spawn the fan-out after the origin mutation
//! commits and do not await it on the response path.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::key::KeyBuilder;
use crate::cache::memory::MemoryTier;
use crate::remote::RemoteCache;

// == Invalidator ==
/// Pattern-based invalidation across both cache tiers.
pub struct Invalidator {
    keys: KeyBuilder,
    memory: Arc<RwLock<MemoryTier>>,
    remote: Arc<dyn RemoteCache>,
}

impl Invalidator {
    // == Constructor ==
    pub fn new(
        keys: KeyBuilder,
        memory: Arc<RwLock<MemoryTier>>,
        remote: Arc<dyn RemoteCache>,
    ) -> Self {
        Self {
            keys,
            memory,
            remote,
        }
    }

    // == Fan Out ==
    /// Invalidates every key family covering the given (campus, letter)
    /// pairs; pass the old row's pair, plus the new row's when a write moved
    /// it. Duplicate patterns across pairs are collapsed before any delete
    /// is issued. Returns the number of remote keys deleted.
    pub async fn fan_out(&self, touched: &[(&str, &str)]) -> usize {
        let mut patterns: Vec<String> = Vec::new();
        for &(campus, letter) in touched {
            for pattern in self
                .keys
                .invalidation_patterns(Some(campus), Some(letter))
            {
                if !patterns.contains(&pattern) {
                    patterns.push(pattern);
                }
            }
        }

        // Local purge first: this process must stop serving the stale
        // listings even if every remote delete fails.
        {
            let mut memory = self.memory.write().await;
            for pattern in &patterns {
                memory.remove_prefix(pattern);
            }
        }

        // The catch-all patterns overlap the specific ones, so key listings
        // are unioned before the deletes go out.
        let globs: Vec<String> = patterns.iter().map(|p| format!("{}*", p)).collect();
        let listings = join_all(globs.iter().map(|glob| self.remote.keys(glob))).await;

        let mut targets: Vec<String> = Vec::new();
        for (glob, listing) in globs.iter().zip(listings) {
            match listing {
                Ok(keys) => {
                    for key in keys {
                        if !targets.contains(&key) {
                            targets.push(key);
                        }
                    }
                }
                Err(err) => {
                    warn!(glob = %glob, error = %err, "remote key listing failed during invalidation")
                }
            }
        }

        let removed = self.delete_all(&targets).await;
        debug!(
            patterns = patterns.len(),
            removed, "invalidation fan-out complete"
        );
        removed
    }

    // == Purge Glob ==
    /// Removes every key matching a glob pattern from both tiers. The memory
    /// tier is purged by the pattern's literal prefix (everything before the
    /// first wildcard), which can over-delete; in a cache that only costs a
    /// few extra misses. Returns the number of remote keys deleted; remote
    /// failures are logged and reported as zero.
    pub async fn purge_glob(&self, glob: &str) -> usize {
        let prefix = glob.split('*').next().unwrap_or(glob);
        self.memory.write().await.remove_prefix(prefix);

        let keys = match self.remote.keys(glob).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(glob, error = %err, "remote key listing failed during invalidation");
                return 0;
            }
        };

        self.delete_all(&keys).await
    }

    /// Issues deletes for every key in parallel; an individual failure is
    /// logged and does not abort the others. Returns the success count.
    async fn delete_all(&self, keys: &[String]) -> usize {
        let results = join_all(keys.iter().map(|key| self.remote.delete(key))).await;

        let mut removed = 0;
        for (key, result) in keys.iter().zip(results) {
            match result {
                Ok(()) => removed += 1,
                Err(err) => warn!(key = %key, error = %err, "remote delete failed during invalidation"),
            }
        }
        removed
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryRemote;
    use anyhow::bail;
    use async_trait::async_trait;
    use serde_json::json;

    async fn seeded() -> (Invalidator, Arc<InMemoryRemote>, Arc<RwLock<MemoryTier>>) {
        let remote = Arc::new(InMemoryRemote::new());
        let memory = Arc::new(RwLock::new(MemoryTier::new(100)));

        let listing_keys = [
            "siteindex:CSM:A:",
            "siteindex:CSM:A:library",
            "siteindex:CSM::",
            "siteindex::A:",
            "siteindex:::",
            "siteindex:SKYLINE:B:",
        ];
        for key in listing_keys {
            remote.set(key, "[]", 600).await.unwrap();
            memory.write().await.set(key.to_string(), json!([]), 60_000);
        }

        let invalidator = Invalidator::new(
            KeyBuilder::new("siteindex"),
            memory.clone(),
            remote.clone(),
        );
        (invalidator, remote, memory)
    }

    #[tokio::test]
    async fn test_fan_out_removes_all_affected_families() {
        let (invalidator, remote, memory) = seeded().await;

        invalidator.fan_out(&[("CSM", "A")]).await;

        for key in [
            "siteindex:CSM:A:",
            "siteindex:CSM:A:library",
            "siteindex:CSM::",
            "siteindex::A:",
            "siteindex:::",
        ] {
            assert_eq!(remote.get(key).await.unwrap(), None, "{} should be gone", key);
            assert_eq!(memory.write().await.get(key), None, "{} should be gone", key);
        }
    }

    #[tokio::test]
    async fn test_fan_out_spares_unrelated_campus() {
        let (invalidator, remote, memory) = seeded().await;

        invalidator.fan_out(&[("CSM", "A")]).await;

        assert!(remote.get("siteindex:SKYLINE:B:").await.unwrap().is_some());
        assert!(memory.write().await.get("siteindex:SKYLINE:B:").is_some());
    }

    #[tokio::test]
    async fn test_fan_out_covers_old_and_new_pair() {
        let (invalidator, remote, _memory) = seeded().await;

        // A row moved campus: both families must go.
        invalidator.fan_out(&[("CSM", "A"), ("SKYLINE", "B")]).await;

        assert_eq!(remote.get("siteindex:CSM:A:").await.unwrap(), None);
        assert_eq!(remote.get("siteindex:SKYLINE:B:").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fan_out_counts_deduped_deletes() {
        let (invalidator, _remote, _memory) = seeded().await;

        // Same pair twice: the shared catch-alls are only deleted once.
        let removed = invalidator.fan_out(&[("CSM", "A"), ("CSM", "A")]).await;
        assert_eq!(removed, 5);
    }

    #[tokio::test]
    async fn test_purge_glob_arbitrary_pattern() {
        let (invalidator, remote, _memory) = seeded().await;

        let removed = invalidator.purge_glob("siteindex:CSM:*").await;

        assert_eq!(removed, 3);
        assert_eq!(remote.get("siteindex:CSM:A:").await.unwrap(), None);
        assert!(remote.get("siteindex:SKYLINE:B:").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fan_out_survives_broken_remote() {
        /// Remote double whose every call fails.
        struct BrokenRemote;

        #[async_trait]
        impl RemoteCache for BrokenRemote {
            async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
                bail!("connection reset")
            }
            async fn set(&self, _k: &str, _v: &str, _t: u64) -> anyhow::Result<()> {
                bail!("connection reset")
            }
            async fn delete(&self, _key: &str) -> anyhow::Result<()> {
                bail!("connection reset")
            }
            async fn keys(&self, _pattern: &str) -> anyhow::Result<Vec<String>> {
                bail!("connection reset")
            }
        }

        let memory = Arc::new(RwLock::new(MemoryTier::new(100)));
        memory
            .write()
            .await
            .set("siteindex:CSM:A:".to_string(), json!([]), 60_000);

        let invalidator = Invalidator::new(
            KeyBuilder::new("siteindex"),
            memory.clone(),
            Arc::new(BrokenRemote),
        );

        let removed = invalidator.fan_out(&[("CSM", "A")]).await;

        // Remote deletes failed but the local purge still happened.
        assert_eq!(removed, 0);
        assert_eq!(memory.write().await.get("siteindex:CSM:A:"), None);
    }
}
