//! Refresh Token Entity
//!
//! Opaque, server-tracked credentials used to obtain new access tokens.
//! Only a SHA-256 hash of the token value is persisted; the raw value is
//! handed to the client exactly once at creation and never stored.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Entropy of the raw token value in bytes.
const TOKEN_BYTES: usize = 32;

/// Persisted refresh token record.
///
/// `revoked` flips false -> true exactly once (rotation or logout) and is
/// never reset. Expired and revoked records are kept until external
/// retention cleanup removes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// SHA-256 hex digest of the raw token value
    pub token_hash: String,

    /// Owning user id
    pub user_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,

    pub revoked: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Generate a raw token value and its persistable record.
    ///
    /// Returns `(raw_value, record)`. The raw value is base64url without
    /// padding; the record only carries its hash.
    pub fn generate_token_pair(user_id: impl Into<String>, validity: Duration) -> (String, Self) {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let raw = URL_SAFE_NO_PAD.encode(bytes);

        let now = Utc::now();
        let record = Self {
            id: crate::TsidGenerator::generate(),
            token_hash: Self::hash_token(&raw),
            user_id: user_id.into(),
            expires_at: now + validity,
            revoked: false,
            created_at: now,
        };
        (raw, record)
    }

    /// Hash a raw token value for storage and lookup.
    pub fn hash_token(raw: &str) -> String {
        format!("{:x}", Sha256::digest(raw.as_bytes()))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
