//! Response DTOs for the directory API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use super::entry::SiteEntry;

/// Response body for GET /api/sites.
#[derive(Debug, Clone, Serialize)]
pub struct ListSitesResponse {
    /// Matching directory rows
    pub entries: Vec<SiteEntry>,
    /// Total row count for the filter
    pub total: u64,
    /// Whether the listing was served from a cache tier
    pub cache_hit: bool,
    /// Wall-clock time spent producing the listing
    pub timing_ms: u64,
}

/// Response body for DELETE /api/sites/:id.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSiteResponse {
    /// Success message
    pub message: String,
    /// The id that was deleted
    pub id: i64,
}

impl DeleteSiteResponse {
    /// Creates a new DeleteSiteResponse
    pub fn new(id: i64) -> Self {
        Self {
            message: format!("Site entry {} deleted successfully", id),
            id,
        }
    }
}

/// Response body for GET /api/cache/stats.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Number of listing keys currently present in the remote tier
    pub total_keys: usize,
    /// hits / (hits + misses), 0 when nothing has been recorded today
    pub hit_rate: f64,
    /// Cache-eligible lookups recorded today
    pub total_requests: u64,
    /// Lookups served from a cache tier today
    pub cached_requests: u64,
}

/// Response body for DELETE /api/cache.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of keys removed across both tiers
    pub invalidated: usize,
    /// The pattern that was applied
    pub pattern: String,
}

/// Response body for the health endpoint (GET /health).
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_entry() -> SiteEntry {
        SiteEntry {
            id: 1,
            title: "Library".to_string(),
            url: "https://example.edu/library".to_string(),
            campus: "CSM".to_string(),
            letter: "L".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_response_serialize() {
        let resp = ListSitesResponse {
            entries: vec![sample_entry()],
            total: 1,
            cache_hit: true,
            timing_ms: 2,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Library"));
        assert!(json.contains("\"cache_hit\":true"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteSiteResponse::new(7);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
