//! Cache Key Module
//!
//! Builds deterministic, namespaced cache keys from listing filters, and the
//! prefix patterns used to invalidate whole families of keys.
//!
//! Key layout: `<namespace>:<campus>:<letter>:<search>`. Absent components
//! become explicit empty segments rather than being skipped, so every key has
//! the same number of colon-delimited segments and prefix matching stays
//! well-defined. Admin tooling lists and deletes by this convention, so the
//! layout must not change.

use crate::models::ListFilter;

// == Key Builder ==
/// Composes cache keys and invalidation patterns under a fixed namespace.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    namespace: String,
}

impl KeyBuilder {
    // == Constructor ==
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// The configured namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == List Key ==
    /// Builds the cache key for a listing filter.
    ///
    /// Case folding happens here so that logically identical filters always
    /// produce byte-identical keys: campus and letter are upper-cased, search
    /// terms lower-cased (lookups are case-insensitive). Always succeeds,
    /// including for the all-absent (unfiltered) filter.
    pub fn list_key(&self, filter: &ListFilter) -> String {
        format!(
            "{}:{}:{}:{}",
            self.namespace,
            fold_upper(filter.campus.as_deref()),
            fold_upper(filter.letter.as_deref()),
            fold_lower(filter.search.as_deref()),
        )
    }

    // == Invalidation Patterns ==
    /// Builds the key prefixes that could contain a row with the given
    /// campus and letter.
    ///
    /// A cached "show all" or "show campus" listing can include any row, so a
    /// write must cover the (campus, letter), (campus, any), (any, letter)
    /// and (any, any) families, each left open over the search segment, plus
    /// the catch-all prefix over every campus-unfiltered key. Duplicates that
    /// arise from absent components are collapsed.
    pub fn invalidation_patterns(
        &self,
        campus: Option<&str>,
        letter: Option<&str>,
    ) -> Vec<String> {
        let campus = fold_upper(campus);
        let letter = fold_upper(letter);

        let candidates = [
            format!("{}:{}:{}:", self.namespace, campus, letter),
            format!("{}:{}::", self.namespace, campus),
            format!("{}::{}:", self.namespace, letter),
            format!("{}:::", self.namespace),
            format!("{}::", self.namespace),
        ];

        let mut patterns: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !patterns.contains(&candidate) {
                patterns.push(candidate);
            }
        }
        patterns
    }

    // == Stats Keys ==
    /// Key for one of the per-day stats counters, e.g.
    /// `siteindex:stats:2026-08-07:hits`.
    pub fn stats_key(&self, day: &str, counter: &str) -> String {
        format!("{}:stats:{}:{}", self.namespace, day, counter)
    }

    /// Prefix shared by all stats bookkeeping keys; listing-key counts
    /// exclude anything under it.
    pub fn stats_prefix(&self) -> String {
        format!("{}:stats:", self.namespace)
    }
}

fn fold_upper(component: Option<&str>) -> String {
    component.map(|c| c.trim().to_uppercase()).unwrap_or_default()
}

fn fold_lower(component: Option<&str>) -> String {
    component.map(|c| c.trim().to_lowercase()).unwrap_or_default()
}
