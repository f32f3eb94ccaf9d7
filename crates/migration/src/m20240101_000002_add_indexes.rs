use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_retrieval_queue::RetrievalQueue;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Confirmation by barcode looks up waiting rows per item
        manager
            .create_index(
                Index::create()
                    .name("idx_retrieval_queue_item_barcode")
                    .table(RetrievalQueue::Table)
                    .col(RetrievalQueue::ItemBarcode)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Staff screens list one facility at a time
        manager
            .create_index(
                Index::create()
                    .name("idx_retrieval_queue_storage_retrieved")
                    .table(RetrievalQueue::Table)
                    .col(RetrievalQueue::RemoteStorageId)
                    .col(RetrievalQueue::RetrievedDateTime)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_retrieval_queue_storage_retrieved").table(RetrievalQueue::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_retrieval_queue_item_barcode").table(RetrievalQueue::Table).to_owned())
            .await
    }
}
