//! Admin API handlers for cache management.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::app::AppState;

/// Response for a cache clear operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheClearResponse {
    /// Success indicator
    pub success: bool,
    /// Entries dropped by the reset
    pub entries_removed: usize,
    /// Descriptive message
    pub message: String,
}

/// Cache statistics for monitoring
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheStatsResponse {
    /// Entries currently held
    pub entries: usize,
    /// Reads served from cache
    pub hits: u64,
    /// Reads that went to a provider
    pub misses: u64,
    /// Hit percentage over all reads
    #[schema(example = 87.5)]
    pub hit_rate: f64,
}

/// Clear the snapshot cache
///
/// Drops every cached provider snapshot. The next analysis for any address
/// goes back to the providers and spends rate-limit budget.
#[utoipa::path(
    post,
    path = "/admin/cache/clear",
    tag = "admin",
    responses(
        (status = 200, description = "Cache cleared", body = CacheClearResponse)
    )
)]
pub async fn clear_cache_handler(State(state): State<Arc<AppState>>) -> Json<CacheClearResponse> {
    let entries_removed = state.service.clear_cache();
    info!(entries_removed, "admin cache clear");
    Json(CacheClearResponse {
        success: true,
        entries_removed,
        message: format!("Removed {} cached snapshots", entries_removed),
    })
}

/// Report cache statistics
#[utoipa::path(
    get,
    path = "/admin/cache/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStatsResponse)
    )
)]
pub async fn cache_stats_handler(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let stats = state.service.cache_stats();
    Json(CacheStatsResponse {
        entries: stats.entries,
        hits: stats.hits,
        misses: stats.misses,
        hit_rate: stats.hit_rate,
    })
}
