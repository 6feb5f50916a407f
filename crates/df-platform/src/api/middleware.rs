//! API Middleware
//!
//! Bearer-token authentication for Axum handlers. The extractor validates
//! the access token and builds the request-scoped `AuthContext`; there is
//! no ambient caller state anywhere.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::error::PlatformError;
use crate::repository::UserStore;
use crate::service::{extract_bearer_token, AuthContext, AuthService};

/// Application state shared by the authentication extractor.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Resolve validated claims against the current user record.
    ///
    /// Role and active status come from the database, not from the token,
    /// so a role change or deactivation takes effect on the next request
    /// even while old tokens are still within their TTL.
    async fn build_context(&self, token: &str) -> Result<AuthContext, PlatformError> {
        let claims = self.auth_service.validate_token(token)?;

        let user = self
            .users
            .find_by_username(&claims.sub)
            .await?
            .ok_or(PlatformError::InvalidToken)?;

        if !user.active {
            return Err(PlatformError::InvalidToken);
        }

        Ok(AuthContext {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }
}

/// Extractor for authenticated requests.
pub struct Authenticated(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PlatformError::InvalidToken.into_response())?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| PlatformError::InvalidToken.into_response())?;

        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| {
                PlatformError::internal("AppState missing from request extensions")
                    .into_response()
            })?;

        let context = app_state
            .build_context(token)
            .await
            .map_err(|e| e.into_response())?;

        Ok(Authenticated(context))
    }
}
