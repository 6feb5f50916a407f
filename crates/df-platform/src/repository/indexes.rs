//! Index Setup
//!
//! Creates the unique and lookup indexes the repositories rely on.
//! Safe to run on every startup; Mongo treats existing indexes as no-ops.

use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};
use tracing::info;

use crate::domain::{Deal, RefreshTokenRecord, User};
use crate::error::Result;

pub async fn ensure_indexes(db: &Database) -> Result<()> {
    let users = db.collection::<User>("users");
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    let refresh_tokens = db.collection::<RefreshTokenRecord>("refresh_tokens");
    refresh_tokens
        .create_index(
            IndexModel::builder()
                .keys(doc! { "tokenHash": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    let deals = db.collection::<Deal>("deals");
    deals
        .create_index(IndexModel::builder().keys(doc! { "ownerId": 1 }).build())
        .await?;
    deals
        .create_index(
            IndexModel::builder()
                .keys(doc! { "stage": 1, "sector": 1 })
                .build(),
        )
        .await?;

    info!("Database indexes ensured");
    Ok(())
}
