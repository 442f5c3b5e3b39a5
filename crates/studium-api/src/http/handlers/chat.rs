//! Chat message HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/sessions/{id}/messages - Ordered history of a session
//! - POST /api/v1/sessions/{id}/messages - Send a message, get the reply
//!
//! Sending always succeeds with HTTP 200 once the session check passes:
//! provider failures surface as a fallback reply with `success = false`,
//! never as an error status.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// GET /api/v1/sessions/{id}/messages - Get the session's turns in order.
pub async fn get_messages(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let messages = state.chat_service.get_messages(owner, sid).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let messages_json: Vec<serde_json::Value> = messages
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let resp = ApiResponse::success(messages_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{sid}/messages"));

    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/messages - Send a message to the assistant.
pub async fn send_message(
    State(state): State<AppState>,
    Authenticated(owner): Authenticated,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let sid = parse_uuid(&session_id)?;
    let reply = state.chat_service.send_message(owner, sid, message).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let reply_json = serde_json::json!({
        "success": reply.success,
        "reply": reply.reply,
        "model": reply.model,
        "timestamp": reply.timestamp.to_rfc3339(),
    });

    let resp = ApiResponse::success(reply_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{sid}/messages"));

    Ok(Json(resp))
}
