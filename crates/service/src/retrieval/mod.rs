//! Retrieval queue: domain types, filter building, persistence and the
//! orchestration service, in the same domain / repository / service split as
//! the rest of the crate.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::RetrievalQueueService;
