use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::pagination::Pagination;
use service::retrieval::domain::FilterCriteria;

use super::ServerState;
use crate::dto::{is_canonical_uuid, RetrievalQueues};
use crate::errors::{retrieval_error, JsonApiError};
use crate::observability::RECORDS_RETRIEVED_TOTAL;

/// Query string of the list endpoint. Bounds are read wide so that
/// out-of-range values get a proper 400 instead of a decode failure.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub retrieved: Option<bool>,
    pub storage_id: Option<String>,
    /// ISO local date-time, e.g. `2021-01-20T10:00:00`
    pub created_date_time: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<ListQuery> for FilterCriteria {
    type Error = JsonApiError;

    fn try_from(q: ListQuery) -> Result<Self, Self::Error> {
        let offset = q.offset.unwrap_or(0);
        let limit = q.limit.unwrap_or(i64::from(common::pagination::DEFAULT_LIMIT));
        if !Pagination::in_range(offset, limit) {
            return Err(JsonApiError::bad_request("offset and limit must be between 0 and 2147483647"));
        }
        Ok(FilterCriteria {
            retrieved: q.retrieved,
            storage_id: q.storage_id,
            created_date_time: q.created_date_time,
            offset: u32::try_from(offset).ok(),
            limit: u32::try_from(limit).ok(),
        })
    }
}

#[utoipa::path(
    get, path = "/remote-storage/retrievals", tag = "retrievals",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching retrieval queue records", body = RetrievalQueues),
        (status = 400, description = "Bad date or paging parameters")
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<RetrievalQueues>, JsonApiError> {
    let criteria = FilterCriteria::try_from(q)?;
    let page = state.retrievals.list_retrievals(&criteria).await?;
    info!(total = page.total_records, returned = page.records.len(), "list retrievals");
    Ok(Json(page.into()))
}

#[utoipa::path(
    post, path = "/remote-storage/retrievals/{id}/retrieved", tag = "retrievals",
    params(("id" = String, Path, description = "Retrieval queue record id")),
    responses(
        (status = 204, description = "Marked as retrieved"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Retrieval queue not found")
    )
)]
pub async fn mark_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    if !is_canonical_uuid(&id) {
        return Err(JsonApiError::bad_request(format!("invalid retrieval queue id: {}", id)));
    }
    let id = Uuid::try_parse(&id).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
    state.retrievals.mark_retrieved_by_id(id).await.map_err(retrieval_error)?;
    RECORDS_RETRIEVED_TOTAL.inc();
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/remote-storage/retrievals/barcode/{barcode}/retrieved", tag = "retrievals",
    params(("barcode" = String, Path, description = "Item barcode")),
    responses(
        (status = 204, description = "Marked as retrieved"),
        (status = 404, description = "Retrieval queue not found")
    )
)]
pub async fn mark_by_barcode(State(state): State<ServerState>, Path(barcode): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.retrievals.mark_retrieved_by_barcode(&barcode).await.map_err(retrieval_error)?;
    RECORDS_RETRIEVED_TOTAL.inc();
    Ok(StatusCode::NO_CONTENT)
}
