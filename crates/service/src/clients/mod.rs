//! Typed access to the modules the retrieval queue depends on.
//!
//! Every lookup answers `Ok(None)` for an empty result list; callers decide
//! whether that is an error through [`crate::errors::require`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::return_item::domain::CheckInItem;

pub mod domain;
pub mod okapi;
pub mod mock;

use domain::{Instance, Item, Request, User};

pub use okapi::OkapiClient;

#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn item_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError>;
    async fn instance_by_id(&self, instance_id: &str) -> Result<Option<Instance>, ServiceError>;
}

#[async_trait]
pub trait UsersClient: Send + Sync {
    async fn user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError>;
}

#[async_trait]
pub trait ItemRequestsClient: Send + Sync {
    /// Open requests placed on the item, in queue order.
    async fn outstanding_requests(&self, item_id: &str) -> Result<Vec<Request>, ServiceError>;
}

/// Performs the physical check-in once the queue has been updated.
#[async_trait]
pub trait CheckInClient: Send + Sync {
    async fn check_in_by_barcode(&self, storage_configuration_id: Uuid, item: &CheckInItem) -> Result<(), ServiceError>;
}
