//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions               - Create a session (becomes active)
//! - GET    /api/v1/sessions               - List the caller's sessions
//! - PUT    /api/v1/sessions/{id}          - Rename a session
//! - DELETE /api/v1/sessions/{id}          - Delete a session and its turns
//! - POST   /api/v1/sessions/{id}/activate - Make a session the active one

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for renaming a session.
#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub title: String,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// POST /api/v1/sessions - Create a new session for the caller.
pub async fn create_session(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state.chat_service.create_session(owner).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let session_json = serde_json::to_value(&session)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let resp = ApiResponse::success(session_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{}", session.id))
        .with_link(
            "messages",
            &format!("/api/v1/sessions/{}/messages", session.id),
        );

    Ok(Json(resp))
}

/// GET /api/v1/sessions - List the caller's sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.chat_service.list_sessions(owner).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let sessions_json: Vec<serde_json::Value> = sessions
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let resp = ApiResponse::success(sessions_json, request_id, elapsed)
        .with_link("self", "/api/v1/sessions");

    Ok(Json(resp))
}

/// PUT /api/v1/sessions/{id} - Rename a session.
pub async fn rename_session(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
    Path(session_id): Path<String>,
    Json(body): Json<RenameSessionRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }

    let sid = parse_uuid(&session_id)?;
    state.chat_service.rename_session(owner, sid, title).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"id": sid, "title": title}),
        request_id,
        elapsed,
    )
    .with_link("self", &format!("/api/v1/sessions/{sid}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Delete a session and its turns.
pub async fn delete_session(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.chat_service.delete_session(owner, sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(serde_json::json!({"deleted": sid}), request_id, elapsed);

    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/activate - Make a session the caller's active one.
pub async fn activate_session(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.chat_service.activate_session(owner, sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(serde_json::json!({"active": sid}), request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{sid}"));

    Ok(Json(resp))
}
