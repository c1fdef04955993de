//! GET /api/v1/health - liveness plus chat log store status.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use carechat_infra::store::StoreStatus;

use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub store: String,
    pub version: &'static str,
}

/// 200 while the store is ready, 503 otherwise.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthReport>>) {
    let start = Instant::now();
    let store_status = state.store().status().await;

    let (code, status) = match store_status {
        StoreStatus::Ready => (StatusCode::OK, "ok"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };
    let report = HealthReport {
        status,
        store: store_status.to_string(),
        version: env!("CARGO_PKG_VERSION"),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    (
        code,
        Json(ApiResponse::success(report, Uuid::now_v7().to_string(), elapsed)),
    )
}
