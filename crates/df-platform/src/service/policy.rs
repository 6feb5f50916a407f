//! Access Policy
//!
//! Pure authorization decisions and role-scoped projection of deal data.
//! No persistence: everything operates on an explicit, request-scoped
//! `AuthContext` threaded through as an argument.

use serde::Serialize;

use crate::domain::{Deal, DealNote, DealStage, DealType, Role};

/// Request-scoped caller identity, built by the API middleware from a
/// validated access token plus the current user record.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Role-filtered view of a deal note.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealNoteView {
    pub note_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<&DealNote> for DealNoteView {
    fn from(note: &DealNote) -> Self {
        Self {
            note_id: note.note_id.clone(),
            author_id: note.author_id.clone(),
            text: note.text.clone(),
            created_at: note.created_at.to_rfc3339(),
        }
    }
}

/// Role-filtered view of a deal.
///
/// `deal_value` is omitted from the serialized form when absent, never
/// null-padded, so a non-admin response carries no trace of the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealView {
    pub id: String,
    pub title: String,
    pub sector: String,
    pub deal_type: DealType,
    pub stage: DealStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_value: Option<f64>,
    pub notes: Vec<DealNoteView>,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Deal> for DealView {
    fn from(deal: &Deal) -> Self {
        Self {
            id: deal.id.clone(),
            title: deal.title.clone(),
            sector: deal.sector.clone(),
            deal_type: deal.deal_type,
            stage: deal.stage,
            deal_value: deal.deal_value,
            notes: deal.notes().iter().map(DealNoteView::from).collect(),
            owner_id: deal.owner_id.clone(),
            created_at: deal.created_at.to_rfc3339(),
            updated_at: deal.updated_at.to_rfc3339(),
        }
    }
}

/// Project a deal view for a role: admins see every field, everyone else
/// loses the sensitive value. Idempotent.
pub fn project_for_role(view: DealView, role: Role) -> DealView {
    if role.is_admin() {
        view
    } else {
        DealView {
            deal_value: None,
            ..view
        }
    }
}

/// A deal is readable by its owner or an admin.
pub fn can_read_deal(deal: &Deal, ctx: &AuthContext) -> bool {
    ctx.is_admin() || deal.owner_id == ctx.user_id
}

/// Only admins may supply or change the sensitive deal value.
pub fn can_write_deal_value(ctx: &AuthContext) -> bool {
    ctx.is_admin()
}

/// A note is deletable by its author or an admin.
pub fn can_delete_note(note: &DealNote, ctx: &AuthContext) -> bool {
    ctx.is_admin() || note.author_id == ctx.user_id
}

/// Capability checks shared by every admin endpoint.
pub mod checks {
    use super::AuthContext;
    use crate::error::{PlatformError, Result};

    /// The single source of truth for "admin only".
    pub fn require_admin(ctx: &AuthContext) -> Result<()> {
        if ctx.is_admin() {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Admin role required"))
        }
    }
}
