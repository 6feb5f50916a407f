//! Refresh Token Ledger
//!
//! Create / validate / revoke for opaque refresh tokens. `revoke` is the
//! single choke point shared by explicit logout and rotation, and it is
//! deliberately not idempotent: revoking an unknown, revoked, or expired
//! token fails with the matching error kind.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::domain::{RefreshTokenRecord, User};
use crate::error::{PlatformError, Result};
use crate::repository::RefreshTokenStore;

/// Refresh token validity window: 7 days.
const REFRESH_TOKEN_VALIDITY_SECS: i64 = 7 * 24 * 60 * 60;

pub struct RefreshTokenLedger {
    store: Arc<dyn RefreshTokenStore>,
    validity: Duration,
}

impl RefreshTokenLedger {
    pub fn new(store: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            store,
            validity: Duration::seconds(REFRESH_TOKEN_VALIDITY_SECS),
        }
    }

    pub fn with_validity_secs(mut self, secs: i64) -> Self {
        self.validity = Duration::seconds(secs);
        self
    }

    /// Mint and persist a new refresh token for a user.
    ///
    /// Returns the raw opaque value (for the client) and the stored record.
    pub async fn create(&self, user: &User) -> Result<(String, RefreshTokenRecord)> {
        let (raw, record) = RefreshTokenRecord::generate_token_pair(&user.id, self.validity);
        self.store.insert(&record).await?;
        debug!(user_id = %user.id, token_id = %record.id, "refresh token created");
        Ok((raw, record))
    }

    /// Look up a presented token value.
    ///
    /// The three failure kinds are distinguishable: the token is opaque to
    /// the client, so surfacing its lifecycle state leaks nothing about
    /// signing internals.
    pub async fn validate(&self, raw: &str) -> Result<RefreshTokenRecord> {
        let hash = RefreshTokenRecord::hash_token(raw);
        let record = self
            .store
            .find_by_hash(&hash)
            .await?
            .ok_or(PlatformError::RefreshTokenNotFound)?;

        if record.revoked {
            return Err(PlatformError::RefreshTokenRevoked);
        }
        if record.is_expired(Utc::now()) {
            return Err(PlatformError::RefreshTokenExpired);
        }
        Ok(record)
    }

    /// Revoke a presented token value.
    ///
    /// Validates first, then flips `revoked` with a conditional update
    /// keyed on `revoked=false`. If a concurrent caller committed its
    /// revoke between our validate and our update, the conditional update
    /// matches nothing and this caller observes `RefreshTokenRevoked`:
    /// exactly one of two racing revocations succeeds.
    pub async fn revoke(&self, raw: &str) -> Result<RefreshTokenRecord> {
        self.validate(raw).await?;

        let hash = RefreshTokenRecord::hash_token(raw);
        match self.store.revoke_if_active(&hash).await? {
            Some(record) => {
                debug!(token_id = %record.id, "refresh token revoked");
                Ok(record)
            }
            None => Err(PlatformError::RefreshTokenRevoked),
        }
    }
}
