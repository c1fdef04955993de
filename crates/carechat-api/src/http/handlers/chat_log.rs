//! Chat log HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chat-logs                    - Append one exchange
//! - GET  /api/v1/chat-logs/{id}               - Get a single entry
//! - GET  /api/v1/sessions/{id}/chat-logs      - List a session's exchanges

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use carechat_core::chat_log::repository::ChatLogRepository;
use carechat_types::chat_log::{ChatLogEntry, NewChatLogEntry};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for session history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/chat-logs - Append one exchange.
///
/// Strict: storage failures are reported to the caller.
pub async fn append(
    State(state): State<AppState>,
    Json(entry): Json<NewChatLogEntry>,
) -> Result<(StatusCode, Json<ApiResponse<ChatLogEntry>>), AppError> {
    let started = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let saved = state.chat_log_service.append(&entry).await?;

    let elapsed = started.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(saved, request_id, elapsed);

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/chat-logs/{id} - Get an entry by id.
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ChatLogEntry>>, AppError> {
    let started = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let entry = state
        .store()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat log entry {id} not found")))?;

    let elapsed = started.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(entry, request_id, elapsed);

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id}/chat-logs - A session's exchanges in write order.
pub async fn list_for_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<ChatLogEntry>>>, AppError> {
    let started = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if let Some(limit) = query.limit.filter(|limit| *limit < 1) {
        return Err(AppError::Validation(format!(
            "limit must be at least 1, got {limit}"
        )));
    }

    let entries = state
        .chat_log_service
        .history(&session_id, query.limit)
        .await?;

    let elapsed = started.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(entries, request_id, elapsed);

    Ok(Json(resp))
}
