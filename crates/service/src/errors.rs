use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("item return error: {0}")]
    ItemReturn(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

/// Turn an empty upstream lookup into `NotFound`.
/// This is the single place where "no result" becomes an error.
pub fn require<T>(found: Option<T>, entity: impl AsRef<str>) -> Result<T, ServiceError> {
    found.ok_or_else(|| ServiceError::not_found(entity.as_ref()))
}
