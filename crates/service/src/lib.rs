//! Service layer for the remote storage retrieval queue.
//! - Separates business logic from data access and upstream HTTP calls.
//! - Reuses validation and entity definitions in `models` crate.
//! - Collaborators sit behind traits so tests run against in-memory mocks.

pub mod errors;
pub mod clients;
pub mod location;
pub mod retrieval;
pub mod return_item;
#[cfg(test)]
pub mod test_support;

pub use retrieval::RetrievalQueueService;
pub use return_item::ReturnItemService;
