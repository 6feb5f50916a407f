//! Auth API Endpoints
//!
//! Session lifecycle endpoints:
//! - POST /login - Password-based login
//! - POST /refresh - Refresh token rotation
//! - POST /logout - Refresh token revocation

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::PlatformError;
use crate::service::{SessionService, SessionTokens};

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name
    pub username: String,

    /// Password
    pub password: String,
}

/// Token pair response for login and refresh
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh token; a refresh always returns a new one
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,
}

impl From<SessionTokens> for AuthResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Refresh / logout request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The opaque refresh token
    pub refresh_token: String,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthApiState {
    pub sessions: Arc<SessionService>,
}

/// Login with username and password
///
/// Returns an access/refresh token pair. Failures are undifferentiated:
/// the response never reveals whether the username exists.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, PlatformError> {
    let tokens = state.sessions.login(&req.username, &req.password).await?;
    Ok(Json(tokens.into()))
}

/// Refresh the session
///
/// Exchanges a refresh token for a new token pair. The presented token is
/// revoked in the same operation (rotation); reusing it afterwards fails.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = AuthResponse),
        (status = 401, description = "Unknown, revoked, or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AuthApiState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<AuthResponse>, PlatformError> {
    let tokens = state.sessions.refresh(&req.refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// Logout
///
/// Revokes the presented refresh token. Logging out with an unknown,
/// already-revoked, or expired token is an observable error.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 204, description = "Logout successful"),
        (status = 401, description = "Unknown, revoked, or expired refresh token")
    )
)]
pub async fn logout(
    State(state): State<AuthApiState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, PlatformError> {
    state.sessions.logout(&req.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the auth router
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .with_state(state)
}
