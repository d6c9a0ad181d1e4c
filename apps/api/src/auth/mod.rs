//! Authentication — YAML credential store, argon2 password verification,
//! opaque bearer tokens.
//!
//! The rest of the service treats this as a gate: a request either carries a
//! valid, unexpired token or it is rejected. Nothing downstream inspects
//! identity beyond the display name.

pub mod handlers;

use std::collections::HashMap;

use anyhow::{Context, Result};
use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Credential store
// ────────────────────────────────────────────────────────────────────────────

/// On-disk credential file layout (credentials.yaml).
#[derive(Debug, Deserialize)]
pub struct CredentialsFile {
    pub credentials: Credentials,
    pub cookie: CookieSettings,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub usernames: HashMap<String, UserRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// Display name shown after login.
    pub name: String,
    /// Argon2 PHC-format password hash.
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CookieSettings {
    pub name: String,
    pub expiry_days: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("malformed password hash for user '{0}'")]
    BadHash(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TokenRecord {
    name: String,
    expires_at: DateTime<Utc>,
}

/// Tri-state authentication status for the session probe.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    /// Valid token. Carries the display name.
    Authenticated(String),
    /// Token presented but invalid or expired.
    Failed,
    /// No token presented yet.
    Pending,
}

pub struct AuthService {
    users: HashMap<String, UserRecord>,
    token_lifetime: Duration,
    tokens: RwLock<HashMap<String, TokenRecord>>,
}

impl AuthService {
    /// Loads the credential store. A missing or malformed file is fatal —
    /// the caller (startup) propagates the error and the process halts.
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("credentials file not found at {path}"))?;
        let file: CredentialsFile =
            serde_yaml::from_str(&raw).with_context(|| format!("invalid credentials file {path}"))?;
        info!(
            "Loaded {} user(s) from credential store (cookie '{}', expiry {} days)",
            file.credentials.usernames.len(),
            file.cookie.name,
            file.cookie.expiry_days
        );
        Ok(Self::new(
            file.credentials.usernames,
            Duration::days(file.cookie.expiry_days),
        ))
    }

    pub fn new(users: HashMap<String, UserRecord>, token_lifetime: Duration) -> Self {
        Self {
            users,
            token_lifetime,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Verifies the password and issues a fresh bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let record = self
            .users
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = PasswordHash::new(&record.password)
            .map_err(|_| AuthError::BadHash(username.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let issued = IssuedToken {
            token: Uuid::new_v4().simple().to_string(),
            name: record.name.clone(),
            expires_at: Utc::now() + self.token_lifetime,
        };
        self.tokens.write().await.insert(
            issued.token.clone(),
            TokenRecord {
                name: issued.name.clone(),
                expires_at: issued.expires_at,
            },
        );
        info!("User '{username}' logged in");
        Ok(issued)
    }

    pub async fn logout(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }

    /// Tri-state probe: no token → Pending, bad/expired → Failed,
    /// valid → Authenticated with the display name.
    pub async fn status(&self, token: Option<&str>) -> AuthStatus {
        let Some(token) = token else {
            return AuthStatus::Pending;
        };
        let tokens = self.tokens.read().await;
        match tokens.get(token) {
            Some(record) if record.expires_at > Utc::now() => {
                AuthStatus::Authenticated(record.name.clone())
            }
            _ => AuthStatus::Failed,
        }
    }
}

/// Pulls the bearer token out of the Authorization header.
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware gating the workspace and preset routes.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request);
    match state.auth.status(token).await {
        AuthStatus::Authenticated(_) => Ok(next.run(request).await),
        _ => {
            warn!("Rejected unauthenticated request to {}", request.uri().path());
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::PasswordHasher;

    fn service_with_user(username: &str, password: &str) -> AuthService {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();
        let mut users = HashMap::new();
        users.insert(
            username.to_string(),
            UserRecord {
                name: "Avery Example".to_string(),
                password: hash,
            },
        );
        AuthService::new(users, Duration::days(7))
    }

    #[tokio::test]
    async fn test_login_with_correct_password() {
        let auth = service_with_user("avery", "hunter2");
        let issued = auth.login("avery", "hunter2").await.unwrap();
        assert_eq!(issued.name, "Avery Example");
        assert!(issued.expires_at > Utc::now());

        let status = auth.status(Some(&issued.token)).await;
        assert_eq!(status, AuthStatus::Authenticated("Avery Example".to_string()));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_fails() {
        let auth = service_with_user("avery", "hunter2");
        assert!(matches!(
            auth.login("avery", "hunter3").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user_fails() {
        let auth = service_with_user("avery", "hunter2");
        assert!(matches!(
            auth.login("nobody", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_status_tristate() {
        let auth = service_with_user("avery", "hunter2");
        assert_eq!(auth.status(None).await, AuthStatus::Pending);
        assert_eq!(auth.status(Some("bogus")).await, AuthStatus::Failed);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let auth = service_with_user("avery", "hunter2");
        let issued = auth.login("avery", "hunter2").await.unwrap();
        auth.logout(&issued.token).await;
        assert_eq!(auth.status(Some(&issued.token)).await, AuthStatus::Failed);
    }

    #[tokio::test]
    async fn test_expired_token_is_failed() {
        let auth = service_with_user("avery", "hunter2");
        // Zero lifetime: the token is already expired when issued.
        let auth = AuthService::new(auth.users.clone(), Duration::seconds(-1));
        let issued = auth.login("avery", "hunter2").await.unwrap();
        assert_eq!(auth.status(Some(&issued.token)).await, AuthStatus::Failed);
    }

    #[test]
    fn test_credentials_file_parses() {
        let yaml = r#"
credentials:
  usernames:
    avery:
      name: Avery Example
      password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAA"
cookie:
  name: adforge_auth
  expiry_days: 30
"#;
        let parsed: CredentialsFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.cookie.expiry_days, 30);
        assert!(parsed.credentials.usernames.contains_key("avery"));
    }
}
