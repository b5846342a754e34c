//! In-Memory Remote Backend
//!
//! A glob-aware, TTL-honoring RemoteCache implementation backed by a plain
//! map. Stands in for the shared store in the dev server and the test suite;
//! production hosts wire their own backend behind the same trait.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::RemoteCache;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    /// Unix milliseconds; None = no expiry
    expires_at: Option<u64>,
}

impl StoredValue {
    fn is_expired(&self, now_ms: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now_ms >= expires)
    }
}

// == In-Memory Remote ==
/// Process-local stand-in for the shared key-value tier.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys, for tests and diagnostics.
    pub fn len(&self) -> usize {
        let now = now_ms();
        self.entries
            .read()
            .expect("remote map lock poisoned")
            .values()
            .filter(|stored| !stored.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// Matches a key against a glob pattern where `*` spans any run of
/// characters. Segments between wildcards must appear in order.
fn glob_match(pattern: &str, key: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == key;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let mut remainder = key;

    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match remainder.strip_prefix(segment) {
                Some(rest) => remainder = rest,
                None => return false,
            }
        } else if i == segments.len() - 1 && !pattern.ends_with('*') {
            return remainder.ends_with(segment);
        } else {
            match remainder.find(segment) {
                Some(pos) => remainder = &remainder[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}

#[async_trait]
impl RemoteCache for InMemoryRemote {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let now = now_ms();

        // Expired entries are dropped on read rather than swept.
        let mut entries = self.entries.write().expect("remote map lock poisoned");
        match entries.get(key) {
            Some(stored) if stored.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()> {
        let expires_at = (ttl_secs > 0).then(|| now_ms() + ttl_secs * 1000);
        self.entries
            .write()
            .expect("remote map lock poisoned")
            .insert(
                key.to_string(),
                StoredValue {
                    value: value.to_string(),
                    expires_at,
                },
            );
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries
            .write()
            .expect("remote map lock poisoned")
            .remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> anyhow::Result<Vec<String>> {
        let now = now_ms();
        Ok(self
            .entries
            .read()
            .expect("remote map lock poisoned")
            .iter()
            .filter(|(key, stored)| !stored.is_expired(now) && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
