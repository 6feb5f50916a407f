//! Refresh Token Repository
//!
//! The conditional update in `revoke_if_active` is the atomic unit the
//! rotation protocol depends on: the filter includes `revoked: false`, so
//! of two concurrent revocations of the same token exactly one matches.

use async_trait::async_trait;
use mongodb::{bson::doc, options::ReturnDocument, Collection, Database};

use crate::domain::RefreshTokenRecord;
use crate::error::Result;
use crate::repository::RefreshTokenStore;

pub struct RefreshTokenRepository {
    collection: Collection<RefreshTokenRecord>,
}

impl RefreshTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("refresh_tokens"),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self
            .collection
            .find_one(doc! { "tokenHash": token_hash })
            .await?)
    }

    async fn revoke_if_active(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self
            .collection
            .find_one_and_update(
                doc! { "tokenHash": token_hash, "revoked": false },
                doc! { "$set": { "revoked": true } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}
