//! Cache management endpoints

use axum::{extract::State, response::Json};

use crate::cache::CacheStats;
use crate::service::{server::AppState, types::CacheClearedResponse};

pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.annotator.cache().stats())
}

/// Drop every cached annotation
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearedResponse> {
    let cache = state.annotator.cache();
    let cleared = cache.stats().size;
    cache.invalidate_all();
    Json(CacheClearedResponse { cleared })
}
