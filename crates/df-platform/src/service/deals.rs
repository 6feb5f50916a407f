//! Deal Service
//!
//! Deal CRUD and note collaboration, gated by the access policy. The
//! caller's `AuthContext` is threaded through every operation.

use std::sync::Arc;

use tracing::info;

use crate::domain::{Deal, DealNote, DealStage, DealType};
use crate::error::{PlatformError, Result};
use crate::repository::DealStore;
use crate::service::policy::{self, checks, AuthContext};

/// Input for deal creation.
#[derive(Debug, Clone)]
pub struct DealDraft {
    pub title: String,
    pub sector: String,
    pub deal_type: DealType,
    /// Honored for admins only; silently discarded otherwise.
    pub deal_value: Option<f64>,
}

/// Partial update of non-sensitive deal fields.
#[derive(Debug, Clone, Default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub sector: Option<String>,
    pub deal_type: Option<DealType>,
    pub stage: Option<DealStage>,
}

pub struct DealService {
    deals: Arc<dyn DealStore>,
}

impl DealService {
    pub fn new(deals: Arc<dyn DealStore>) -> Self {
        Self { deals }
    }

    /// Create a deal owned by the caller. Stage always starts at Lead.
    ///
    /// A non-admin-supplied deal value is discarded, not rejected: the
    /// stored deal simply has no value until an admin sets one.
    pub async fn create_deal(&self, draft: DealDraft, ctx: &AuthContext) -> Result<Deal> {
        if draft.title.trim().is_empty() {
            return Err(PlatformError::validation("Title must not be empty"));
        }

        let deal_value = if policy::can_write_deal_value(ctx) {
            draft.deal_value
        } else {
            None
        };

        let deal = Deal::new(draft.title, draft.sector, draft.deal_type, &ctx.user_id)
            .with_deal_value(deal_value);

        self.deals.insert(&deal).await?;
        info!(deal_id = %deal.id, owner_id = %ctx.user_id, "deal created");
        Ok(deal)
    }

    /// Fetch a single deal; owner or admin only.
    pub async fn get_deal(&self, deal_id: &str, ctx: &AuthContext) -> Result<Deal> {
        let deal = self
            .deals
            .find_by_id(deal_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Deal", deal_id))?;

        if !policy::can_read_deal(&deal, ctx) {
            return Err(PlatformError::forbidden("You do not own this deal"));
        }
        Ok(deal)
    }

    /// List deals filtered by stage/sector. Open to any authenticated
    /// caller; the sensitive field is stripped per role at projection.
    pub async fn list_deals(
        &self,
        stage: Option<DealStage>,
        sector: Option<&str>,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)> {
        self.deals.find_filtered(stage, sector, offset, limit).await
    }

    /// List the caller's own deals.
    pub async fn my_deals(
        &self,
        ctx: &AuthContext,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)> {
        self.deals.find_by_owner(&ctx.user_id, offset, limit).await
    }

    /// Patch non-sensitive fields; owner or admin only. A deal value in
    /// the request is ignored here; it has its own admin-only path.
    pub async fn update_deal(
        &self,
        deal_id: &str,
        patch: DealPatch,
        ctx: &AuthContext,
    ) -> Result<Deal> {
        let mut deal = self
            .deals
            .find_by_id(deal_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Deal", deal_id))?;

        if !policy::can_read_deal(&deal, ctx) {
            return Err(PlatformError::forbidden("Not allowed to update this deal"));
        }

        if let Some(title) = patch.title {
            deal.title = title;
        }
        if let Some(sector) = patch.sector {
            deal.sector = sector;
        }
        if let Some(deal_type) = patch.deal_type {
            deal.deal_type = deal_type;
        }
        if let Some(stage) = patch.stage {
            // Stage is an open set: any value is settable at any time.
            deal.stage = stage;
        }
        deal.touch();

        self.deals.update(&deal).await?;
        Ok(deal)
    }

    /// Set the sensitive deal value. Admin only.
    pub async fn update_deal_value(
        &self,
        deal_id: &str,
        deal_value: Option<f64>,
        ctx: &AuthContext,
    ) -> Result<Deal> {
        checks::require_admin(ctx)?;

        let mut deal = self
            .deals
            .find_by_id(deal_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Deal", deal_id))?;

        deal.deal_value = deal_value;
        deal.touch();
        self.deals.update(&deal).await?;
        info!(deal_id = %deal.id, "deal value updated");
        Ok(deal)
    }

    /// Delete a deal. Admin only.
    pub async fn delete_deal(&self, deal_id: &str, ctx: &AuthContext) -> Result<()> {
        checks::require_admin(ctx)?;

        if !self.deals.delete(deal_id).await? {
            return Err(PlatformError::not_found("Deal", deal_id));
        }
        info!(deal_id = %deal_id, "deal deleted");
        Ok(())
    }

    /// Append a note authored by the caller.
    pub async fn add_note(&self, deal_id: &str, text: &str, ctx: &AuthContext) -> Result<Deal> {
        if text.trim().is_empty() {
            return Err(PlatformError::validation("Note text must not be empty"));
        }

        let mut deal = self
            .deals
            .find_by_id(deal_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Deal", deal_id))?;

        deal.push_note(DealNote::new(&ctx.user_id, text));
        self.deals.update(&deal).await?;
        Ok(deal)
    }

    /// Remove a note: author or admin only.
    pub async fn delete_note(
        &self,
        deal_id: &str,
        note_id: &str,
        ctx: &AuthContext,
    ) -> Result<Deal> {
        let mut deal = self
            .deals
            .find_by_id(deal_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Deal", deal_id))?;

        let note = deal
            .find_note(note_id)
            .ok_or_else(|| PlatformError::not_found("DealNote", note_id))?;

        if !policy::can_delete_note(note, ctx) {
            return Err(PlatformError::forbidden("Not allowed to delete this note"));
        }

        deal.remove_note(note_id);
        self.deals.update(&deal).await?;
        Ok(deal)
    }
}
