//! Deals API
//!
//! REST endpoints for deal CRUD and note collaboration. Every response
//! passes through the role projection, so non-admins never see the
//! sensitive deal value.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::common::{ApiResult, PaginatedResponse, PaginationParams, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{Deal, DealStage, DealType};
use crate::error::PlatformError;
use crate::service::policy::{self, AuthContext, DealView};
use crate::service::{AuditService, DealDraft, DealPatch, DealService};

/// Create deal request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealCreateRequest {
    pub title: String,
    pub sector: String,
    pub deal_type: DealType,

    /// Honored for admins only; silently discarded otherwise
    pub deal_value: Option<f64>,
}

/// Patch deal request (non-sensitive fields)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealUpdateRequest {
    pub title: Option<String>,
    pub sector: Option<String>,
    pub deal_type: Option<DealType>,
    pub stage: Option<DealStage>,
}

/// Admin-only deal value update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealValueUpdateRequest {
    pub deal_value: Option<f64>,
}

/// Add note request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCreateRequest {
    pub text: String,
}

/// Query parameters for deal listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Filter by stage name (case-insensitive)
    pub stage: Option<String>,

    /// Filter by sector
    pub sector: Option<String>,
}

/// Deals service state
#[derive(Clone)]
pub struct DealsState {
    pub deal_service: Arc<DealService>,
    pub audit_service: Option<Arc<AuditService>>,
}

fn parse_stage(s: &str) -> Result<DealStage, PlatformError> {
    match s.to_uppercase().as_str() {
        "PROSPECTING" => Ok(DealStage::Prospecting),
        "LEAD" => Ok(DealStage::Lead),
        "QUALIFIED" => Ok(DealStage::Qualified),
        "TERM_SHEET" => Ok(DealStage::TermSheet),
        "DUE_DILIGENCE" => Ok(DealStage::DueDiligence),
        "WON" => Ok(DealStage::Won),
        "CLOSED" => Ok(DealStage::Closed),
        "LOST" => Ok(DealStage::Lost),
        _ => Err(PlatformError::validation(format!("Invalid stage: {}", s))),
    }
}

fn projected(deal: &Deal, ctx: &AuthContext) -> DealView {
    policy::project_for_role(DealView::from(deal), ctx.role)
}

/// Create a deal owned by the caller
pub async fn create_deal(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Json(req): Json<DealCreateRequest>,
) -> ApiResult<DealView> {
    let deal = state
        .deal_service
        .create_deal(
            DealDraft {
                title: req.title,
                sector: req.sector,
                deal_type: req.deal_type,
                deal_value: req.deal_value,
            },
            &auth,
        )
        .await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_create(&auth, "Deal", &deal.id, format!("Created deal {}", deal.title))
            .await;
    }

    Ok(Json(projected(&deal, &auth)))
}

/// List deals, optionally filtered by stage/sector
pub async fn list_deals(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Query(query): Query<DealsQuery>,
) -> ApiResult<PaginatedResponse<DealView>> {
    let stage = query.stage.as_deref().map(parse_stage).transpose()?;

    let (deals, total) = state
        .deal_service
        .list_deals(
            stage,
            query.sector.as_deref(),
            query.pagination.offset(),
            i64::from(query.pagination.limit),
        )
        .await?;

    let views = deals.iter().map(|d| projected(d, &auth)).collect();
    Ok(Json(PaginatedResponse::new(
        views,
        query.pagination.page,
        query.pagination.limit,
        total,
    )))
}

/// List the caller's own deals
pub async fn my_deals(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<DealView>> {
    let (deals, total) = state
        .deal_service
        .my_deals(&auth, pagination.offset(), i64::from(pagination.limit))
        .await?;

    let views = deals.iter().map(|d| projected(d, &auth)).collect();
    Ok(Json(PaginatedResponse::new(
        views,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Get a single deal (owner or admin)
pub async fn get_deal(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Path(deal_id): Path<String>,
) -> ApiResult<DealView> {
    let deal = state.deal_service.get_deal(&deal_id, &auth).await?;
    Ok(Json(projected(&deal, &auth)))
}

/// Patch non-sensitive deal fields (owner or admin)
pub async fn update_deal(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Path(deal_id): Path<String>,
    Json(req): Json<DealUpdateRequest>,
) -> ApiResult<DealView> {
    let deal = state
        .deal_service
        .update_deal(
            &deal_id,
            DealPatch {
                title: req.title,
                sector: req.sector,
                deal_type: req.deal_type,
                stage: req.stage,
            },
            &auth,
        )
        .await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_update(&auth, "Deal", &deal.id, format!("Updated deal {}", deal.title))
            .await;
    }

    Ok(Json(projected(&deal, &auth)))
}

/// Set the sensitive deal value (admin only)
pub async fn update_deal_value(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Path(deal_id): Path<String>,
    Json(req): Json<DealValueUpdateRequest>,
) -> ApiResult<DealView> {
    let deal = state
        .deal_service
        .update_deal_value(&deal_id, req.deal_value, &auth)
        .await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_update(&auth, "Deal", &deal.id, "Updated deal value")
            .await;
    }

    Ok(Json(projected(&deal, &auth)))
}

/// Delete a deal (admin only)
pub async fn delete_deal(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Path(deal_id): Path<String>,
) -> ApiResult<SuccessResponse> {
    state.deal_service.delete_deal(&deal_id, &auth).await?;

    if let Some(ref audit) = state.audit_service {
        let _ = audit
            .log_delete(&auth, "Deal", &deal_id, "Deleted deal")
            .await;
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Add a note to a deal
pub async fn add_note(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Path(deal_id): Path<String>,
    Json(req): Json<NoteCreateRequest>,
) -> ApiResult<DealView> {
    let deal = state.deal_service.add_note(&deal_id, &req.text, &auth).await?;
    Ok(Json(projected(&deal, &auth)))
}

/// Delete a note (author or admin)
pub async fn delete_note(
    State(state): State<DealsState>,
    Authenticated(auth): Authenticated,
    Path((deal_id, note_id)): Path<(String, String)>,
) -> ApiResult<DealView> {
    let deal = state
        .deal_service
        .delete_note(&deal_id, &note_id, &auth)
        .await?;
    Ok(Json(projected(&deal, &auth)))
}

/// Create the deals router
pub fn deals_router(state: DealsState) -> Router {
    Router::new()
        .route("/", post(create_deal).get(list_deals))
        .route("/my", get(my_deals))
        .route("/:deal_id", get(get_deal).patch(update_deal).delete(delete_deal))
        .route("/:deal_id/value", patch(update_deal_value))
        .route("/:deal_id/notes", post(add_note))
        .route("/:deal_id/notes/:note_id", delete(delete_note))
        .with_state(state)
}
