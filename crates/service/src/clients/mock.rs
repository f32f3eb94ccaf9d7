//! In-memory stand-in for the platform modules, for tests and doc examples.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::domain::{Instance, Item, Request, User};
use super::{CheckInClient, InventoryClient, ItemRequestsClient, UsersClient};
use crate::errors::ServiceError;
use crate::return_item::domain::CheckInItem;

#[derive(Default)]
pub struct MockUpstream {
    items: Vec<Item>,
    instances: Vec<Instance>,
    users: Vec<User>,
    requests: HashMap<String, Vec<Request>>,
    fail_check_in: bool,
    check_ins: Mutex<Vec<(Uuid, CheckInItem)>>,
}

impl MockUpstream {
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.push(instance);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_requests(mut self, item_id: &str, requests: Vec<Request>) -> Self {
        self.requests.insert(item_id.to_string(), requests);
        self
    }

    pub fn failing_check_in(mut self) -> Self {
        self.fail_check_in = true;
        self
    }

    /// Check-ins received so far, oldest first.
    pub async fn check_ins(&self) -> Vec<(Uuid, CheckInItem)> {
        self.check_ins.lock().await.clone()
    }
}

#[async_trait]
impl InventoryClient for MockUpstream {
    async fn item_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError> {
        Ok(self.items.iter().find(|i| i.barcode.as_deref() == Some(barcode)).cloned())
    }

    async fn instance_by_id(&self, instance_id: &str) -> Result<Option<Instance>, ServiceError> {
        Ok(self.instances.iter().find(|i| i.id == instance_id).cloned())
    }
}

#[async_trait]
impl UsersClient for MockUpstream {
    async fn user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }
}

#[async_trait]
impl ItemRequestsClient for MockUpstream {
    async fn outstanding_requests(&self, item_id: &str) -> Result<Vec<Request>, ServiceError> {
        Ok(self.requests.get(item_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CheckInClient for MockUpstream {
    async fn check_in_by_barcode(&self, storage_configuration_id: Uuid, item: &CheckInItem) -> Result<(), ServiceError> {
        if self.fail_check_in {
            return Err(ServiceError::Upstream("check-in rejected".into()));
        }
        self.check_ins.lock().await.push((storage_configuration_id, item.clone()));
        Ok(())
    }
}
