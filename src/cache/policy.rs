//! TTL Policy Module
//!
//! Classifies listing queries by expected popularity and assigns each class a
//! memory/remote TTL pair. The unfiltered and per-campus listings are the
//! bread and butter of the public directory, so they live longest; per-letter
//! listings sit in the middle; search-term queries are numerous and rarely
//! repeated, so they expire quickly. Search terms below a minimum length are
//! not cached at all, which keeps incidental keystrokes from growing the key
//! space without bound.

use crate::config::Config;
use crate::models::ListFilter;

// == Priority ==
/// Popularity class of a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Unfiltered or campus-only listings
    Hot,
    /// Per-letter listings
    Warm,
    /// Search-term queries
    Cold,
}

// == TTL Pair ==
/// TTLs for one priority class, one per cache tier.
#[derive(Debug, Clone, Copy)]
pub struct TtlPair {
    /// Memory-tier TTL in milliseconds
    pub memory_ttl_ms: u64,
    /// Remote-tier TTL in seconds
    pub remote_ttl_secs: u64,
}

// == TTL Policy ==
/// The configured tri-level TTL policy plus the short-search exclusion rule.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    hot: TtlPair,
    warm: TtlPair,
    cold: TtlPair,
    min_search_len: usize,
}

impl TtlPolicy {
    // == Constructor ==
    pub fn from_config(config: &Config) -> Self {
        Self {
            hot: TtlPair {
                memory_ttl_ms: config.hot_memory_ttl_ms,
                remote_ttl_secs: config.hot_remote_ttl_secs,
            },
            warm: TtlPair {
                memory_ttl_ms: config.warm_memory_ttl_ms,
                remote_ttl_secs: config.warm_remote_ttl_secs,
            },
            cold: TtlPair {
                memory_ttl_ms: config.cold_memory_ttl_ms,
                remote_ttl_secs: config.cold_remote_ttl_secs,
            },
            min_search_len: config.min_search_len,
        }
    }

    // == Classify ==
    /// Maps a filter to its popularity class.
    pub fn classify(&self, filter: &ListFilter) -> Priority {
        if filter.search.is_some() {
            Priority::Cold
        } else if filter.letter.is_some() {
            Priority::Warm
        } else {
            Priority::Hot
        }
    }

    // == TTLs ==
    /// TTL pair for a priority class.
    pub fn ttls(&self, priority: Priority) -> TtlPair {
        match priority {
            Priority::Hot => self.hot,
            Priority::Warm => self.warm,
            Priority::Cold => self.cold,
        }
    }

    // == Is Cacheable ==
    /// Whether a filter's results may be stored in any cache tier.
    ///
    /// Only search terms can make a query uncacheable: anything shorter than
    /// the minimum length goes straight to the origin and nothing is stored.
    pub fn is_cacheable(&self, filter: &ListFilter) -> bool {
        match &filter.search {
            Some(term) => term.chars().count() >= self.min_search_len,
            None => true,
        }
    }
}
