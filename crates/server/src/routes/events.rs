use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::{debug, info};

use service::retrieval::domain::MovedEventRequest;

use super::ServerState;
use crate::errors::JsonApiError;
use crate::observability::{MOVED_EVENTS_IGNORED_TOTAL, RECORDS_CREATED_TOTAL, SOURCE_ITEM_MOVED};

/// Entry point for item moved events delivered by the messaging layer.
#[utoipa::path(
    post, path = "/remote-storage/events/item-moved", tag = "events",
    request_body = crate::dto::MovedEventDoc,
    responses(
        (status = 204, description = "Event handled"),
        (status = 400, description = "Unreadable event"),
        (status = 404, description = "Referenced item, user or instance not found")
    )
)]
pub async fn item_moved(State(state): State<ServerState>, Json(event): Json<Value>) -> Result<StatusCode, JsonApiError> {
    let event = MovedEventRequest::from_event(&event)?;
    match state.retrievals.process_moved_event(&event).await? {
        Some(record) => {
            RECORDS_CREATED_TOTAL.with_label_values(&[SOURCE_ITEM_MOVED]).inc();
            info!(id = %record.id, "item moved event queued");
        }
        None => {
            MOVED_EVENTS_IGNORED_TOTAL.inc();
            debug!("item moved event ignored");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
