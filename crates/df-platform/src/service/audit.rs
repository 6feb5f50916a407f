//! Audit Service
//!
//! Centralized audit logging for session and admin activity. Inserts are
//! best-effort: a failed audit write is logged and never fails the
//! request that triggered it.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{AuditAction, AuditLog};
use crate::error::Result;
use crate::repository::AuditLogStore;
use crate::service::policy::AuthContext;

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditLogStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    pub async fn log_login(&self, username: &str, success: bool) -> Result<()> {
        let desc = if success {
            format!("Successful login for {}", username)
        } else {
            format!("Failed login attempt for {}", username)
        };
        self.insert(AuditLog::new(AuditAction::Login, "Session", desc)).await
    }

    pub async fn log_token_rotated(&self, user_id: &str) -> Result<()> {
        let log = AuditLog::for_entity(
            AuditAction::TokenRotated,
            "Session",
            user_id,
            "Refresh token rotated",
        );
        self.insert(log).await
    }

    pub async fn log_logout(&self, user_id: &str) -> Result<()> {
        let log = AuditLog::for_entity(
            AuditAction::Logout,
            "Session",
            user_id,
            "Refresh token revoked on logout",
        );
        self.insert(log).await
    }

    pub async fn log_create(
        &self,
        ctx: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) -> Result<()> {
        self.log_action(ctx, AuditAction::Create, entity_type, entity_id, description)
            .await
    }

    pub async fn log_update(
        &self,
        ctx: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) -> Result<()> {
        self.log_action(ctx, AuditAction::Update, entity_type, entity_id, description)
            .await
    }

    pub async fn log_delete(
        &self,
        ctx: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) -> Result<()> {
        self.log_action(ctx, AuditAction::Delete, entity_type, entity_id, description)
            .await
    }

    pub async fn log_action(
        &self,
        ctx: &AuthContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) -> Result<()> {
        let log = AuditLog::for_entity(action, entity_type, entity_id, description)
            .with_actor(&ctx.user_id, &ctx.username);
        self.insert(log).await
    }

    async fn insert(&self, log: AuditLog) -> Result<()> {
        info!(
            action = ?log.action,
            entity_type = %log.entity_type,
            entity_id = ?log.entity_id,
            actor_id = ?log.actor_id,
            "Audit log recorded"
        );

        if let Err(e) = self.store.insert(&log).await {
            // Never fail the triggering operation over audit persistence.
            error!(error = %e, "Failed to insert audit log");
        }
        Ok(())
    }
}
