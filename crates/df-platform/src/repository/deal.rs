//! Deal Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Collection, Database,
};

use crate::domain::{Deal, DealStage};
use crate::error::Result;
use crate::repository::DealStore;

pub struct DealRepository {
    collection: Collection<Deal>,
}

impl DealRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("deals"),
        }
    }

    fn filter_doc(stage: Option<DealStage>, sector: Option<&str>) -> Document {
        let mut filter = doc! {};
        if let Some(stage) = stage {
            let stage_str = serde_json::to_string(&stage)
                .unwrap_or_default()
                .trim_matches('"')
                .to_string();
            filter.insert("stage", stage_str);
        }
        if let Some(sector) = sector {
            filter.insert("sector", sector);
        }
        filter
    }

    async fn find_page(&self, filter: Document, offset: u64, limit: i64) -> Result<(Vec<Deal>, u64)> {
        let total = self.collection.count_documents(filter.clone()).await?;
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": -1 })
            .skip(offset)
            .limit(limit)
            .await?;
        let deals = cursor.try_collect().await?;
        Ok((deals, total))
    }
}

#[async_trait]
impl DealStore for DealRepository {
    async fn insert(&self, deal: &Deal) -> Result<()> {
        self.collection.insert_one(deal).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Deal>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_owner(
        &self,
        owner_id: &str,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)> {
        self.find_page(doc! { "ownerId": owner_id }, offset, limit).await
    }

    async fn find_filtered(
        &self,
        stage: Option<DealStage>,
        sector: Option<&str>,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)> {
        self.find_page(Self::filter_doc(stage, sector), offset, limit).await
    }

    async fn update(&self, deal: &Deal) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &deal.id }, deal)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
