use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::pagination::Pagination;
use uuid::Uuid;

use models::retrieval_queue;

use super::domain::{RecordKey, RetrievalFilter};
use crate::errors::ServiceError;

/// Persistence of retrieval queue records.
#[async_trait]
pub trait RetrievalQueueRepository: Send + Sync {
    /// One unsorted page of matching records plus the total match count.
    async fn find_page(&self, filter: &RetrievalFilter, page: Pagination) -> Result<(Vec<retrieval_queue::Model>, u64), ServiceError>;
    /// A record that is still waiting for pickup; the oldest one when a barcode has several.
    async fn find_unretrieved(&self, key: &RecordKey) -> Result<Option<retrieval_queue::Model>, ServiceError>;
    async fn insert(&self, record: retrieval_queue::Model) -> Result<retrieval_queue::Model, ServiceError>;
    /// Set the retrieval time unless someone already did; `false` means nothing changed.
    async fn mark_retrieved(&self, id: Uuid, at: NaiveDateTime) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockRetrievalQueueRepository {
        records: Mutex<Vec<retrieval_queue::Model>>, // insertion order
    }

    impl MockRetrievalQueueRepository {
        pub async fn all(&self) -> Vec<retrieval_queue::Model> {
            self.records.lock().await.clone()
        }
    }

    #[async_trait]
    impl RetrievalQueueRepository for MockRetrievalQueueRepository {
        async fn find_page(&self, filter: &RetrievalFilter, page: Pagination) -> Result<(Vec<retrieval_queue::Model>, u64), ServiceError> {
            let records = self.records.lock().await;
            let matching: Vec<_> = records.iter().filter(|r| filter.matches(r)).cloned().collect();
            let total = matching.len() as u64;
            let (offset, limit) = page.normalize();
            let rows = matching.into_iter().skip(offset as usize).take(limit as usize).collect();
            Ok((rows, total))
        }

        async fn find_unretrieved(&self, key: &RecordKey) -> Result<Option<retrieval_queue::Model>, ServiceError> {
            let records = self.records.lock().await;
            let found = records
                .iter()
                .filter(|r| !r.is_retrieved())
                .filter(|r| match key {
                    RecordKey::Id(id) => r.id == *id,
                    RecordKey::Barcode(b) => r.item_barcode.as_deref() == Some(b.as_str()),
                })
                .min_by_key(|r| r.created_date_time)
                .cloned();
            Ok(found)
        }

        async fn insert(&self, record: retrieval_queue::Model) -> Result<retrieval_queue::Model, ServiceError> {
            retrieval_queue::validate_new(&record)?;
            let mut records = self.records.lock().await;
            if records.iter().any(|r| r.id == record.id) {
                return Err(ServiceError::Db(format!("duplicate retrieval queue id {}", record.id)));
            }
            records.push(record.clone());
            Ok(record)
        }

        async fn mark_retrieved(&self, id: Uuid, at: NaiveDateTime) -> Result<bool, ServiceError> {
            let mut records = self.records.lock().await;
            match records.iter_mut().find(|r| r.id == id && !r.is_retrieved()) {
                Some(r) => {
                    r.retrieved_date_time = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}
