//! # Metrics API
//!
//! - `GET /metrics` — request counters and buffer pool statistics

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use packs_core::PoolStats;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Point-in-time service metrics.
#[derive(Debug, Serialize, ToSchema)]
pub struct MetricsResponse {
    pub requests: u64,
    pub errors: u64,
    pub calculations: u64,
    /// Buffer pool hits, misses, released and discarded pairs.
    #[schema(value_type = Object)]
    pub pool: PoolStats,
}

/// Build the metrics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics))
}

/// GET /metrics — Snapshot request counters and pool statistics.
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Current metrics", body = MetricsResponse),
    ),
    tag = "operations"
)]
pub(crate) async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        requests: state.metrics.requests(),
        errors: state.metrics.errors(),
        calculations: state.metrics.calculations(),
        pool: state.pool.stats(),
    })
}
