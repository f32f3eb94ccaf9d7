//! Shared building blocks used by every crate in the workspace:
//! logging setup, pagination parameters and small HTTP payload types.

pub mod types;
pub mod utils;
pub mod pagination;
