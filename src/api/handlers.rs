//! API Handlers
//!
//! HTTP request handlers for each directory endpoint. All of them are thin:
//! validation, a call into the DirectoryService, a response DTO.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::directory::DirectoryService;
use crate::error::{DirectoryError, Result};
use crate::models::{
    CacheStatsResponse, CreateSiteRequest, DeleteSiteResponse, HealthResponse, InvalidateQuery,
    InvalidateResponse, ListSitesQuery, ListSitesResponse, SiteEntry, UpdateSiteRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cached directory facade
    pub service: Arc<DirectoryService>,
}

impl AppState {
    /// Creates a new AppState around a service.
    pub fn new(service: DirectoryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Handler for GET /api/sites
///
/// Serves a directory listing through the cache tiers, reporting whether a
/// tier answered and how long the lookup took.
pub async fn list_sites_handler(
    State(state): State<AppState>,
    Query(query): Query<ListSitesQuery>,
) -> Result<Json<ListSitesResponse>> {
    let filter = query.into_filter();
    let outcome = state.service.list(&filter).await?;

    Ok(Json(ListSitesResponse {
        entries: outcome.entries,
        total: outcome.total,
        cache_hit: outcome.cache_hit,
        timing_ms: outcome.timing_ms,
    }))
}

/// Handler for POST /api/sites
///
/// Creates a directory entry; the affected cache families are invalidated
/// off the response path.
pub async fn create_site_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateSiteRequest>,
) -> Result<(StatusCode, Json<SiteEntry>)> {
    if let Some(error_msg) = req.validate() {
        return Err(DirectoryError::InvalidRequest(error_msg));
    }

    let created = state.service.create(req.into_new_entry()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /api/sites/:id
///
/// Applies a partial update; both the old and (when moved) new cache
/// families are invalidated off the response path.
pub async fn update_site_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSiteRequest>,
) -> Result<Json<SiteEntry>> {
    if let Some(error_msg) = req.validate() {
        return Err(DirectoryError::InvalidRequest(error_msg));
    }

    let updated = state.service.update(id, req.into_patch()).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/sites/:id
pub async fn delete_site_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteSiteResponse>> {
    let removed = state.service.delete(id).await?;
    Ok(Json(DeleteSiteResponse::new(removed.id)))
}

/// Handler for GET /api/cache/stats
///
/// Returns the cache dashboard numbers.
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let overview = state.service.cache_stats().await;

    Json(CacheStatsResponse {
        total_keys: overview.total_keys,
        hit_rate: overview.stats.hit_rate,
        total_requests: overview.stats.total_requests,
        cached_requests: overview.stats.cached_requests,
    })
}

/// Handler for DELETE /api/cache
///
/// Admin-driven invalidation of a key pattern across both tiers.
pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>> {
    let invalidated = state.service.invalidate_pattern(&query.pattern).await?;

    Ok(Json(InvalidateResponse {
        invalidated,
        pattern: query.pattern,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::remote::InMemoryRemote;
    use crate::repo::MemoryRepository;

    fn state() -> AppState {
        AppState::new(DirectoryService::new(
            &Config::default(),
            Arc::new(MemoryRepository::new()),
            Arc::new(InMemoryRemote::new()),
        ))
    }

    fn create_req(title: &str, campus: &str) -> CreateSiteRequest {
        CreateSiteRequest {
            title: title.to_string(),
            url: format!("https://example.edu/{}", title.to_lowercase()),
            campus: campus.to_string(),
            letter: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_handlers() {
        let state = state();

        let (status, created) =
            create_site_handler(State(state.clone()), Json(create_req("Library", "CSM")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.letter, "L");

        let response = list_sites_handler(State(state), Query(ListSitesQuery::default()))
            .await
            .unwrap();
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.total, 1);
    }

    #[tokio::test]
    async fn test_create_handler_rejects_invalid() {
        let state = state();

        let mut req = create_req("Library", "CSM");
        req.url = "not-a-url".to_string();

        let result = create_site_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(DirectoryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_update_handler_unknown_id() {
        let state = state();

        let req = UpdateSiteRequest {
            title: Some("New Title".to_string()),
            ..Default::default()
        };
        let result = update_site_handler(State(state), Path(42), Json(req)).await;
        assert!(matches!(result, Err(DirectoryError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();

        let (_, created) =
            create_site_handler(State(state.clone()), Json(create_req("Library", "CSM")))
                .await
                .unwrap();

        let response = delete_site_handler(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        assert_eq!(response.id, created.id);

        let result = delete_site_handler(State(state), Path(created.id)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cache_stats_handler_empty() {
        let state = state();

        let response = cache_stats_handler(State(state)).await;
        assert_eq!(response.total_keys, 0);
        assert_eq!(response.total_requests, 0);
        assert_eq!(response.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn test_invalidate_handler_rejects_foreign_namespace() {
        let state = state();

        let query = InvalidateQuery {
            pattern: "otherapp:*".to_string(),
        };
        let result = invalidate_cache_handler(State(state), Query(query)).await;
        assert!(matches!(result, Err(DirectoryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
