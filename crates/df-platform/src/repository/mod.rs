//! Repository Layer
//!
//! Store traits for the persistence seams plus their MongoDB
//! implementations. The session core only depends on the traits, so it can
//! be exercised against in-memory stores in tests.

use async_trait::async_trait;

use crate::domain::{AuditLog, Deal, DealStage, RefreshTokenRecord, User};
use crate::error::Result;

pub mod user;
pub mod deal;
pub mod refresh_token;
pub mod audit_log;
pub mod indexes;

pub use user::UserRepository;
pub use deal::DealRepository;
pub use refresh_token::RefreshTokenRepository;
pub use audit_log::AuditLogRepository;
pub use indexes::ensure_indexes;

/// Credential store: identity lookup and administrative mutation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn exists_by_username(&self, username: &str) -> Result<bool>;
    async fn exists_by_email(&self, email: &str) -> Result<bool>;
    async fn find_all(&self) -> Result<Vec<User>>;
    async fn update(&self, user: &User) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Refresh token ledger storage: lookup by hash, insert, and the one
/// conditional update the rotation protocol relies on.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<()>;
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Atomically flip `revoked` false -> true for the record with this
    /// hash. Returns the revoked record, or `None` if no record with this
    /// hash was still active. Two concurrent calls for the same hash must
    /// never both return `Some`.
    async fn revoke_if_active(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>>;
}

/// Deal storage.
#[async_trait]
pub trait DealStore: Send + Sync {
    async fn insert(&self, deal: &Deal) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Deal>>;
    async fn find_by_owner(&self, owner_id: &str, offset: u64, limit: i64)
        -> Result<(Vec<Deal>, u64)>;
    async fn find_filtered(
        &self,
        stage: Option<DealStage>,
        sector: Option<&str>,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)>;
    async fn update(&self, deal: &Deal) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Audit log storage.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn insert(&self, log: &AuditLog) -> Result<()>;
    async fn find_recent(&self, limit: i64) -> Result<Vec<AuditLog>>;
}
