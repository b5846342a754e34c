//! Remote Cache Module
//!
//! Trait seam for the shared key-value tier, plus the bundled in-process
//! backend and the circuit-breaker decorator that guards the request path
//! against a degraded remote store.

mod breaker;
mod memory;

pub use breaker::GuardedRemote;
pub use memory::InMemoryRemote;

use async_trait::async_trait;

// == Remote Cache Trait ==
/// A shared key-value store with per-key TTL support.
///
/// Implementations are expected to be at-least-eventually-consistent, possibly
/// slow (network round trip) and possibly transiently unavailable; every
/// caller in this crate treats a failure as a cache miss, never as a request
/// error. Values are opaque serialized JSON strings.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Fetches a value, `None` on absence or expiry.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores a value with a TTL in seconds (0 = no expiry).
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()>;

    /// Removes a single key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Lists keys matching a glob pattern (`*` wildcards).
    async fn keys(&self, pattern: &str) -> anyhow::Result<Vec<String>>;
}
