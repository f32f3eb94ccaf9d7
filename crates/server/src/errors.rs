use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// Message returned whenever a queue record lookup comes back empty.
pub const RETRIEVAL_NOT_FOUND: &str = "Retrieval queue not found";

/// JSON error body: a stable title plus an optional human readable detail.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = ?self.message, "request failed");
        }
        (self.status, Json(self)).into_response()
    }
}

/// Like the `From` conversion, but a missing record always reads
/// [`RETRIEVAL_NOT_FOUND`].
pub fn retrieval_error(e: ServiceError) -> JsonApiError {
    match e {
        ServiceError::NotFound(_) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(RETRIEVAL_NOT_FOUND.into())),
        other => other.into(),
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Validation(msg) => JsonApiError::bad_request(msg),
            ServiceError::ItemReturn(msg) => JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Item Return Failed", Some(msg)),
            ServiceError::Upstream(msg) => JsonApiError::new(StatusCode::BAD_GATEWAY, "Upstream Error", Some(msg)),
            ServiceError::Db(_) | ServiceError::Model(_) => {
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("upstream client: {0}")]
    Client(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
