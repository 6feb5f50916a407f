//! Audit Logs Admin API

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::common::ApiResult;
use crate::api::middleware::Authenticated;
use crate::domain::{AuditAction, AuditLog};
use crate::repository::AuditLogStore;
use crate::service::checks;

#[derive(Debug, Deserialize)]
pub struct AuditLogsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 { 100 }

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub description: String,
    pub actor_id: Option<String>,
    pub actor_username: Option<String>,
    pub created_at: String,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            action: log.action,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            description: log.description,
            actor_id: log.actor_id,
            actor_username: log.actor_username,
            created_at: log.created_at.to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct AuditLogsState {
    pub audit_log_store: Arc<dyn AuditLogStore>,
}

/// List recent audit logs (admin only)
pub async fn list_audit_logs(
    State(state): State<AuditLogsState>,
    Authenticated(auth): Authenticated,
    Query(query): Query<AuditLogsQuery>,
) -> ApiResult<Vec<AuditLogResponse>> {
    checks::require_admin(&auth)?;

    let logs = state
        .audit_log_store
        .find_recent(query.limit.clamp(1, 1000))
        .await?;
    Ok(Json(logs.into_iter().map(|l| l.into()).collect()))
}

/// Create the audit logs router
pub fn audit_logs_router(state: AuditLogsState) -> Router {
    Router::new()
        .route("/", get(list_audit_logs))
        .with_state(state)
}
