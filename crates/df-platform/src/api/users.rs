//! Users Admin API
//!
//! REST endpoints for user account management. All mutations are
//! admin-only; `/me` is available to any authenticated caller.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::common::{ApiResult, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{Role, User};
use crate::error::PlatformError;
use crate::service::{checks, AuditService, NewUser, UserService};

/// Create user request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,

    /// Optional role; defaults to USER
    pub role: Option<String>,
}

/// Status update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub active: bool,
}

/// Password reset request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub new_password: String,
}

/// User response DTO. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_service: Arc<UserService>,
    pub audit_service: Option<Arc<AuditService>>,
}

fn parse_role(s: &str) -> Result<Role, PlatformError> {
    match s.to_uppercase().as_str() {
        "USER" => Ok(Role::User),
        "ADMIN" => Ok(Role::Admin),
        _ => Err(PlatformError::validation(format!("Invalid role: {}", s))),
    }
}

/// Create a new user (admin only)
pub async fn create_user(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    checks::require_admin(&auth)?;

    let role = req.role.as_deref().map(parse_role).transpose()?;
    let user = state
        .user_service
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
            role,
        })
        .await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_create(&auth, "User", &user.id, format!("Created user {}", user.username))
            .await;
    }

    Ok(Json(user.into()))
}

/// List all users (admin only)
pub async fn list_users(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
) -> ApiResult<Vec<UserResponse>> {
    checks::require_admin(&auth)?;

    let users = state.user_service.find_all().await?;
    Ok(Json(users.into_iter().map(|u| u.into()).collect()))
}

/// Get a user by username
pub async fn get_user(
    State(state): State<UsersState>,
    Authenticated(_auth): Authenticated,
    Path(username): Path<String>,
) -> ApiResult<UserResponse> {
    let user = state.user_service.find_by_username(&username).await?;
    Ok(Json(user.into()))
}

/// Get the currently authenticated user
pub async fn get_current_user(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
) -> ApiResult<UserResponse> {
    let user = state.user_service.find_by_username(&auth.username).await?;
    Ok(Json(user.into()))
}

/// Promote a user to admin (admin only)
pub async fn promote_user(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
    Path(username): Path<String>,
) -> ApiResult<UserResponse> {
    checks::require_admin(&auth)?;

    let user = state.user_service.promote_to_admin(&username).await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_action(
                &auth,
                crate::domain::AuditAction::RolePromoted,
                "User",
                &user.id,
                format!("Promoted {} to admin", user.username),
            )
            .await;
    }

    Ok(Json(user.into()))
}

/// Activate or deactivate a user (admin only)
pub async fn update_user_status(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
    Path(username): Path<String>,
    Query(req): Query<StatusUpdateRequest>,
) -> ApiResult<UserResponse> {
    checks::require_admin(&auth)?;

    let user = state.user_service.set_active(&username, req.active).await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_action(
                &auth,
                crate::domain::AuditAction::StatusChanged,
                "User",
                &user.id,
                format!("Set {} active={}", user.username, req.active),
            )
            .await;
    }

    Ok(Json(user.into()))
}

/// Reset a user's password (admin only)
pub async fn reset_password(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
    Path(username): Path<String>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<UserResponse> {
    checks::require_admin(&auth)?;

    let user = state
        .user_service
        .reset_password(&username, &req.new_password)
        .await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_action(
                &auth,
                crate::domain::AuditAction::PasswordReset,
                "User",
                &user.id,
                format!("Reset password for {}", user.username),
            )
            .await;
    }

    Ok(Json(user.into()))
}

/// Delete a user (admin only)
pub async fn delete_user(
    State(state): State<UsersState>,
    Authenticated(auth): Authenticated,
    Path(username): Path<String>,
) -> ApiResult<SuccessResponse> {
    checks::require_admin(&auth)?;

    state.user_service.delete_user(&username).await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_delete(&auth, "User", &username, format!("Deleted user {}", username))
            .await;
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Create the users router
pub fn users_router(state: UsersState) -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/me", get(get_current_user))
        .route("/username/:username", get(get_user))
        .route("/:username/make-admin", patch(promote_user))
        .route("/:username/status", patch(update_user_status))
        .route("/:username/password", put(reset_password))
        .route("/:username", delete(delete_user))
        .with_state(state)
}
