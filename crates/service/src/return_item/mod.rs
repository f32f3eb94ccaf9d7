//! Check-in of items returned to remote storage.

pub mod domain;
pub mod service;

pub use service::ReturnItemService;
