//! Create `retrieval_queue` table.
//!
//! One row per item waiting to be pulled from remote storage, or already pulled.
//! `remote_storage_id` points at a storage configuration owned by another
//! module, so there is no foreign key on it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RetrievalQueue::Table)
                    .if_not_exists()
                    .col(uuid(RetrievalQueue::Id).primary_key())
                    .col(string_null(RetrievalQueue::HoldId))
                    .col(string_null(RetrievalQueue::ItemBarcode))
                    .col(string_null(RetrievalQueue::PatronBarcode))
                    .col(string_null(RetrievalQueue::PatronName))
                    .col(string_null(RetrievalQueue::CallNumber))
                    .col(text_null(RetrievalQueue::InstanceTitle))
                    .col(text_null(RetrievalQueue::InstanceAuthor))
                    .col(string_null(RetrievalQueue::PickupLocation))
                    .col(string_null(RetrievalQueue::RequestStatus))
                    .col(text_null(RetrievalQueue::RequestNote))
                    .col(uuid(RetrievalQueue::RemoteStorageId).not_null())
                    .col(timestamp(RetrievalQueue::CreatedDateTime).not_null())
                    .col(timestamp_null(RetrievalQueue::RetrievedDateTime))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(RetrievalQueue::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum RetrievalQueue {
    Table,
    Id,
    HoldId,
    ItemBarcode,
    PatronBarcode,
    PatronName,
    CallNumber,
    InstanceTitle,
    InstanceAuthor,
    PickupLocation,
    RequestStatus,
    RequestNote,
    RemoteStorageId,
    CreatedDateTime,
    RetrievedDateTime,
}
