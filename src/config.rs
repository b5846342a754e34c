//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;

/// Directory cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// TTLs come in memory/remote pairs per popularity tier: hot covers the
/// unfiltered and per-campus listings, warm the per-letter listings, cold the
/// search-term queries.
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace prefix for every cache key
    pub namespace: String,
    /// Maximum number of entries the memory tier can hold
    pub memory_capacity: usize,
    /// Search terms shorter than this are never cached
    pub min_search_len: usize,
    /// Memory TTL in milliseconds for hot queries
    pub hot_memory_ttl_ms: u64,
    /// Remote TTL in seconds for hot queries
    pub hot_remote_ttl_secs: u64,
    /// Memory TTL in milliseconds for warm queries
    pub warm_memory_ttl_ms: u64,
    /// Remote TTL in seconds for warm queries
    pub warm_remote_ttl_secs: u64,
    /// Memory TTL in milliseconds for cold queries
    pub cold_memory_ttl_ms: u64,
    /// Remote TTL in seconds for cold queries
    pub cold_remote_ttl_secs: u64,
    /// Per-call timeout for remote cache operations in milliseconds
    pub remote_timeout_ms: u64,
    /// Consecutive remote failures before the circuit breaker opens
    pub breaker_threshold: u32,
    /// Cool-down in milliseconds while the breaker is open
    pub breaker_cooldown_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Memory-tier sweep interval in seconds
    pub sweep_interval_secs: u64,
}

/// Reads a single environment variable, falling back to a default on absence
/// or parse failure.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAMESPACE` - Cache key namespace (default: "siteindex")
    /// - `MEMORY_CAPACITY` - Memory tier capacity (default: 500)
    /// - `MIN_SEARCH_LEN` - Minimum cacheable search length (default: 3)
    /// - `HOT_MEMORY_TTL_MS` / `HOT_REMOTE_TTL_SECS` - Hot tier TTLs (default: 300000 / 3600)
    /// - `WARM_MEMORY_TTL_MS` / `WARM_REMOTE_TTL_SECS` - Warm tier TTLs (default: 120000 / 900)
    /// - `COLD_MEMORY_TTL_MS` / `COLD_REMOTE_TTL_SECS` - Cold tier TTLs (default: 60000 / 300)
    /// - `REMOTE_TIMEOUT_MS` - Remote cache call timeout (default: 250)
    /// - `BREAKER_THRESHOLD` - Failures before the breaker opens (default: 5)
    /// - `BREAKER_COOLDOWN_MS` - Breaker cool-down (default: 30000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL_SECS` - Memory sweep frequency (default: 60)
    pub fn from_env() -> Self {
        Self {
            namespace: env::var("CACHE_NAMESPACE").unwrap_or_else(|_| "siteindex".to_string()),
            memory_capacity: env_or("MEMORY_CAPACITY", 500),
            min_search_len: env_or("MIN_SEARCH_LEN", 3),
            hot_memory_ttl_ms: env_or("HOT_MEMORY_TTL_MS", 300_000),
            hot_remote_ttl_secs: env_or("HOT_REMOTE_TTL_SECS", 3600),
            warm_memory_ttl_ms: env_or("WARM_MEMORY_TTL_MS", 120_000),
            warm_remote_ttl_secs: env_or("WARM_REMOTE_TTL_SECS", 900),
            cold_memory_ttl_ms: env_or("COLD_MEMORY_TTL_MS", 60_000),
            cold_remote_ttl_secs: env_or("COLD_REMOTE_TTL_SECS", 300),
            remote_timeout_ms: env_or("REMOTE_TIMEOUT_MS", 250),
            breaker_threshold: env_or("BREAKER_THRESHOLD", 5),
            breaker_cooldown_ms: env_or("BREAKER_COOLDOWN_MS", 30_000),
            server_port: env_or("SERVER_PORT", 3000),
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", 60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "siteindex".to_string(),
            memory_capacity: 500,
            min_search_len: 3,
            hot_memory_ttl_ms: 300_000,
            hot_remote_ttl_secs: 3600,
            warm_memory_ttl_ms: 120_000,
            warm_remote_ttl_secs: 900,
            cold_memory_ttl_ms: 60_000,
            cold_remote_ttl_secs: 300,
            remote_timeout_ms: 250,
            breaker_threshold: 5,
            breaker_cooldown_ms: 30_000,
            server_port: 3000,
            sweep_interval_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.namespace, "siteindex");
        assert_eq!(config.memory_capacity, 500);
        assert_eq!(config.min_search_len, 3);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_ttl_tiers_are_ordered() {
        let config = Config::default();
        assert!(config.hot_remote_ttl_secs > config.warm_remote_ttl_secs);
        assert!(config.warm_remote_ttl_secs > config.cold_remote_ttl_secs);
        assert!(config.hot_memory_ttl_ms > config.warm_memory_ttl_ms);
        assert!(config.warm_memory_ttl_ms > config.cold_memory_ttl_ms);
    }
}
