//! Circuit Breaker Module
//!
//! Decorates a RemoteCache with a per-call timeout and a consecutive-failure
//! circuit breaker. After the failure threshold is reached the breaker opens
//! and every call short-circuits for a cool-down period, so a degraded remote
//! tier cannot stall the request path; reads simply fall through to the
//! origin until the tier recovers.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::warn;

use super::RemoteCache;

// == Guarded Remote ==
/// Timeout + circuit-breaker wrapper around any RemoteCache.
pub struct GuardedRemote {
    inner: Arc<dyn RemoteCache>,
    call_timeout: Duration,
    threshold: u32,
    cooldown: Duration,
    /// Consecutive failures since the last success
    failures: AtomicU32,
    /// Unix millis until which the breaker stays open; 0 = closed
    open_until_ms: AtomicU64,
}

impl GuardedRemote {
    // == Constructor ==
    /// Wraps `inner` with the given timeout, failure threshold and cool-down.
    pub fn new(
        inner: Arc<dyn RemoteCache>,
        call_timeout: Duration,
        threshold: u32,
        cooldown: Duration,
    ) -> Self {
        Self {
            inner,
            call_timeout,
            threshold: threshold.max(1),
            cooldown,
            failures: AtomicU32::new(0),
            open_until_ms: AtomicU64::new(0),
        }
    }

    /// Whether calls are currently being short-circuited.
    pub fn is_open(&self) -> bool {
        now_ms() < self.open_until_ms.load(Ordering::Relaxed)
    }

    fn ensure_closed(&self) -> anyhow::Result<()> {
        if self.is_open() {
            bail!("remote cache circuit open, skipping call");
        }
        Ok(())
    }

    fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
        self.open_until_ms.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.threshold {
            let reopen_at = now_ms() + self.cooldown.as_millis() as u64;
            self.open_until_ms.store(reopen_at, Ordering::Relaxed);
            self.failures.store(0, Ordering::Relaxed);
            warn!(
                failures,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "remote cache circuit opened"
            );
        }
    }

    async fn guard<T>(
        &self,
        call: impl std::future::Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.ensure_closed()?;
        match timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => {
                self.record_success();
                Ok(value)
            }
            Ok(Err(err)) => {
                self.record_failure();
                Err(err)
            }
            Err(_) => {
                self.record_failure();
                Err(anyhow!(
                    "remote cache call timed out after {:?}",
                    self.call_timeout
                ))
            }
        }
    }
}

#[async_trait]
impl RemoteCache for GuardedRemote {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.guard(self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()> {
        self.guard(self.inner.set(key, value, ttl_secs)).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.guard(self.inner.delete(key)).await
    }

    async fn keys(&self, pattern: &str) -> anyhow::Result<Vec<String>> {
        self.guard(self.inner.keys(pattern)).await
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Remote double that fails every call and counts how often it is reached.
    #[derive(Default)]
    struct FailingRemote {
        calls: AtomicUsize,
    }

    impl FailingRemote {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl RemoteCache for FailingRemote {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            bail!("connection refused")
        }

        async fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            bail!("connection refused")
        }

        async fn delete(&self, _key: &str) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            bail!("connection refused")
        }

        async fn keys(&self, _pattern: &str) -> anyhow::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            bail!("connection refused")
        }
    }

    fn guarded(inner: Arc<dyn RemoteCache>, threshold: u32) -> GuardedRemote {
        GuardedRemote::new(
            inner,
            Duration::from_millis(100),
            threshold,
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_breaker_passes_through_success() {
        let inner = Arc::new(crate::remote::InMemoryRemote::new());
        let guard = guarded(inner, 3);

        guard.set("k1", "v1", 60).await.unwrap();
        assert_eq!(guard.get("k1").await.unwrap(), Some("v1".to_string()));
        assert!(!guard.is_open());
    }

    #[tokio::test]
    async fn test_breaker_opens_after_threshold() {
        let inner = Arc::new(FailingRemote::default());
        let guard = guarded(inner.clone(), 3);

        for _ in 0..3 {
            assert!(guard.get("k").await.is_err());
        }
        assert!(guard.is_open());
        assert_eq!(inner.calls(), 3);

        // Open breaker short-circuits without reaching the inner remote.
        assert!(guard.get("k").await.is_err());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_breaker_stays_closed_below_threshold() {
        let inner = Arc::new(FailingRemote::default());
        let guard = guarded(inner, 5);

        for _ in 0..4 {
            assert!(guard.get("k").await.is_err());
        }
        assert!(!guard.is_open());
    }

    #[tokio::test]
    async fn test_breaker_closes_after_cooldown() {
        let inner = Arc::new(crate::remote::InMemoryRemote::new());
        let guard = GuardedRemote::new(
            inner,
            Duration::from_millis(100),
            1,
            Duration::from_millis(20),
        );

        // Force the breaker open, then wait out the cool-down.
        guard.record_failure();
        assert!(guard.is_open());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!guard.is_open());

        guard.set("k1", "v1", 60).await.unwrap();
        assert_eq!(guard.get("k1").await.unwrap(), Some("v1".to_string()));
    }

    #[tokio::test]
    async fn test_breaker_success_resets_failure_streak() {
        let healthy = Arc::new(crate::remote::InMemoryRemote::new());
        let guard = guarded(healthy, 2);

        // One failure path is hard to fake on a healthy remote, so drive the
        // counters directly: fail, succeed, fail must not open at threshold 2.
        guard.record_failure();
        guard.record_success();
        guard.record_failure();
        assert!(!guard.is_open());
    }

    #[tokio::test]
    async fn test_breaker_times_out_slow_calls() {
        /// Remote double that hangs forever.
        struct HangingRemote;

        #[async_trait]
        impl RemoteCache for HangingRemote {
            async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
                std::future::pending().await
            }
            async fn set(&self, _k: &str, _v: &str, _t: u64) -> anyhow::Result<()> {
                std::future::pending().await
            }
            async fn delete(&self, _key: &str) -> anyhow::Result<()> {
                std::future::pending().await
            }
            async fn keys(&self, _pattern: &str) -> anyhow::Result<Vec<String>> {
                std::future::pending().await
            }
        }

        let guard = GuardedRemote::new(
            Arc::new(HangingRemote),
            Duration::from_millis(10),
            5,
            Duration::from_secs(60),
        );

        let err = guard.get("k").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
