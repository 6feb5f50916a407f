//! Audit Log Entity
//!
//! Records logins, token lifecycle events, and admin mutations.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Audit action type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    TokenRotated,
    TokenRevoked,
    RolePromoted,
    StatusChanged,
    PasswordReset,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub action: AuditAction,

    /// Entity type affected (e.g., "User", "Deal", "Session")
    pub entity_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    pub description: String,

    /// User who performed the action, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_username: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        action: AuditAction,
        entity_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            action,
            entity_type: entity_type.into(),
            entity_id: None,
            description: description.into(),
            actor_id: None,
            actor_username: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_entity(
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut log = Self::new(action, entity_type, description);
        log.entity_id = Some(entity_id.into());
        log
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>, username: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self.actor_username = Some(username.into());
        self
    }
}
