//! Deal Entity
//!
//! Deals move through an open set of pipeline stages and carry
//! collaborative notes. `deal_value` is the sensitive field: only admins
//! may see or set it.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Deal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealType {
    Merger,
    Acquisition,
    Ipo,
    DebtFinancing,
    EquityFinancing,
    Restructuring,
}

/// Pipeline stage.
///
/// Open enumerated set with no enforced transition graph: an owner or
/// admin may set any stage at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStage {
    Prospecting,
    Lead,
    Qualified,
    TermSheet,
    DueDiligence,
    Won,
    Closed,
    Lost,
}

/// A note attached to a deal by a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealNote {
    pub note_id: String,
    pub author_id: String,
    pub text: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl DealNote {
    pub fn new(author_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            note_id: uuid::Uuid::new_v4().to_string(),
            author_id: author_id.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Deal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,
    pub sector: String,
    pub deal_type: DealType,
    pub stage: DealStage,

    /// Sensitive: visible to and settable by admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_value: Option<f64>,

    #[serde(default)]
    notes: Vec<DealNote>,

    /// User who created/owns the deal
    pub owner_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// New deals always start in the Lead stage.
    pub fn new(
        title: impl Into<String>,
        sector: impl Into<String>,
        deal_type: DealType,
        owner_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            title: title.into(),
            sector: sector.into(),
            deal_type,
            stage: DealStage::Lead,
            deal_value: None,
            notes: Vec::new(),
            owner_id: owner_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_deal_value(mut self, deal_value: Option<f64>) -> Self {
        self.deal_value = deal_value;
        self
    }

    /// Read-only view of the note collection. Mutation goes through
    /// `push_note` / `remove_note` only.
    pub fn notes(&self) -> &[DealNote] {
        &self.notes
    }

    pub fn find_note(&self, note_id: &str) -> Option<&DealNote> {
        self.notes.iter().find(|n| n.note_id == note_id)
    }

    pub fn push_note(&mut self, note: DealNote) {
        self.notes.push(note);
        self.updated_at = Utc::now();
    }

    /// Remove a note by id, returning the removed note if it existed.
    pub fn remove_note(&mut self, note_id: &str) -> Option<DealNote> {
        let index = self.notes.iter().position(|n| n.note_id == note_id)?;
        self.updated_at = Utc::now();
        Some(self.notes.remove(index))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
