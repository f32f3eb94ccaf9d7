use chrono::NaiveDateTime;
use common::pagination::Pagination;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use models::retrieval_queue::{self, Column, Entity};

use crate::errors::ServiceError;
use crate::retrieval::domain::{RecordKey, RetrievalFilter};
use crate::retrieval::filter;
use crate::retrieval::repository::RetrievalQueueRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmRetrievalQueueRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl RetrievalQueueRepository for SeaOrmRetrievalQueueRepository {
    async fn find_page(&self, f: &RetrievalFilter, page: Pagination) -> Result<(Vec<retrieval_queue::Model>, u64), ServiceError> {
        let select = Entity::find().filter(filter::condition(f));
        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let (offset, limit) = page.normalize();
        let rows = select
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok((rows, total))
    }

    async fn find_unretrieved(&self, key: &RecordKey) -> Result<Option<retrieval_queue::Model>, ServiceError> {
        let waiting = Entity::find().filter(Column::RetrievedDateTime.is_null());
        let query = match key {
            RecordKey::Id(id) => waiting.filter(Column::Id.eq(*id)),
            RecordKey::Barcode(barcode) => waiting
                .filter(Column::ItemBarcode.eq(barcode.as_str()))
                .order_by_asc(Column::CreatedDateTime),
        };
        query.one(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn insert(&self, record: retrieval_queue::Model) -> Result<retrieval_queue::Model, ServiceError> {
        Ok(retrieval_queue::create(&self.db, record).await?)
    }

    async fn mark_retrieved(&self, id: Uuid, at: NaiveDateTime) -> Result<bool, ServiceError> {
        Ok(retrieval_queue::mark_retrieved(&self.db, id, at).await?)
    }
}
