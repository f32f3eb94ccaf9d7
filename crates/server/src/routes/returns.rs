use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

use service::return_item::domain::{CheckInItem, ReturnItemResponse};

use super::ServerState;
use crate::dto::is_canonical_uuid;
use crate::errors::JsonApiError;
use crate::observability::{RECORDS_CREATED_TOTAL, RETURNS_PROCESSED_TOTAL, SOURCE_RETURN};

#[utoipa::path(
    post, path = "/remote-storage/return/{remoteStorageConfigurationId}", tag = "returns",
    params(("remoteStorageConfigurationId" = String, Path, description = "Remote storage configuration id")),
    request_body = crate::dto::CheckInItemDoc,
    responses(
        (status = 200, description = "Item checked in", body = crate::dto::ReturnItemResponseDoc),
        (status = 400, description = "Malformed configuration id"),
        (status = 422, description = "Item does not exist"),
        (status = 502, description = "Upstream call failed")
    )
)]
pub async fn return_item(
    State(state): State<ServerState>,
    Path(configuration_id): Path<String>,
    Json(item): Json<CheckInItem>,
) -> Result<Json<ReturnItemResponse>, JsonApiError> {
    if !is_canonical_uuid(&configuration_id) {
        return Err(JsonApiError::bad_request(format!("invalid remote storage configuration id: {}", configuration_id)));
    }
    let configuration_id = Uuid::try_parse(&configuration_id).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
    info!(%configuration_id, barcode = %item.item_barcode, "return item request");
    let response = state.returns.return_item(configuration_id, item).await?;
    RETURNS_PROCESSED_TOTAL
        .with_label_values(&[if response.hold_or_recall_exists { "true" } else { "false" }])
        .inc();
    if let Some(id) = response.queued_record {
        RECORDS_CREATED_TOTAL.with_label_values(&[SOURCE_RETURN]).inc();
        info!(%id, "returned item queued for a waiting request");
    }
    Ok(Json(response))
}
