//! API token authentication extractor.
//!
//! Extracts and verifies API tokens from:
//! - `Authorization: Bearer <token>` header
//! - `X-API-Key: <token>` header
//!
//! Tokens are SHA-256 hashed and compared against the `api_tokens` table.
//! The matched row's `principal_id` becomes the session owner for every
//! chat operation.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated principal. Extracting this validates the API token.
pub struct Authenticated(pub Uuid);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let token_hash = hash_token(&token);

        let result =
            sqlx::query("SELECT principal_id FROM api_tokens WHERE token_hash = ?")
                .bind(&token_hash)
                .fetch_optional(&state.db_pool.reader)
                .await
                .map_err(|e| AppError::Internal(format!("Database error: {e}")))?;

        match result {
            Some(row) => {
                let principal: String = row.get("principal_id");
                let principal_id = principal
                    .parse::<Uuid>()
                    .map_err(|e| AppError::Internal(format!("Corrupt principal_id: {e}")))?;

                // Update last_used_at (best effort, don't fail the request)
                let now = chrono::Utc::now().to_rfc3339();
                let _ = sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE token_hash = ?")
                    .bind(&now)
                    .bind(&token_hash)
                    .execute(&state.db_pool.writer)
                    .await;

                Ok(Authenticated(principal_id))
            }
            None => Err(AppError::Unauthorized(
                "Invalid API token. Provide a valid token via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
            )),
        }
    }
}

/// Extract the API token from request headers.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    // Try Authorization: Bearer <token>
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    // Try X-API-Key header
    if let Some(token) = parts.headers.get("x-api-key") {
        let token_str = token.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(token_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing API token. Provide via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
    ))
}

/// Compute SHA-256 hash of an API token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// Generate a new API token and store its hash in the database.
///
/// Returns the plaintext token (shown to the user once).
pub async fn ensure_api_token(state: &AppState) -> anyhow::Result<String> {
    // Check if any token exists
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT token_hash FROM api_tokens LIMIT 1")
            .fetch_optional(&state.db_pool.reader)
            .await?;

    if existing.is_some() {
        // Token already exists, user must know it from initial creation
        return Ok("(existing token - shown only on first creation)".to_string());
    }

    use rand::RngCore;
    let mut token_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut token_bytes);
    let plaintext_token = format!(
        "stdm_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    let token_hash = hash_token(&plaintext_token);
    let principal_id = Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO api_tokens (token_hash, principal_id, created_at) VALUES (?, ?, ?)")
        .bind(&token_hash)
        .bind(&principal_id)
        .bind(&now)
        .execute(&state.db_pool.writer)
        .await?;

    Ok(plaintext_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let h1 = hash_token("stdm_abc");
        let h2 = hash_token("stdm_abc");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_differs_per_input() {
        assert_ne!(hash_token("stdm_a"), hash_token("stdm_b"));
    }
}
