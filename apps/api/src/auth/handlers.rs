//! Axum route handlers for login, logout, and the session probe.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, AuthStatus};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let issued = state
        .auth
        .login(&request.username, &request.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => AppError::Unauthorized,
            AuthError::BadHash(user) => {
                AppError::Internal(anyhow::anyhow!("malformed password hash for '{user}'"))
            }
        })?;

    Ok(Json(LoginResponse {
        token: issued.token,
        name: issued.name,
        expires_at: issued.expires_at,
    }))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    if let Some(token) = header_token(&headers) {
        state.auth.logout(token).await;
    }
    Json(serde_json::json!({ "status": "logged_out" }))
}

/// GET /api/v1/auth/session
///
/// Tri-state probe: authenticated (with display name), failed, or pending.
pub async fn handle_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse> {
    let response = match state.auth.status(header_token(&headers)).await {
        AuthStatus::Authenticated(name) => SessionStatusResponse {
            status: "authenticated",
            name: Some(name),
        },
        AuthStatus::Failed => SessionStatusResponse {
            status: "failed",
            name: None,
        },
        AuthStatus::Pending => SessionStatusResponse {
            status: "pending",
            name: None,
        },
    };
    Json(response)
}
