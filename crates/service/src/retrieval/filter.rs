//! Turns list criteria into a typed filter and then into a SeaORM condition.

use chrono::NaiveDateTime;
use common::pagination::Pagination;
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use models::retrieval_queue::Column;

use super::domain::{FilterCriteria, RetrievalFilter};
use crate::errors::ServiceError;

pub const WRONG_DATE_FORMAT: &str = "Wrong date format for retrieval queue";

/// Parse an identifier, falling back to the nil UUID.
/// No record carries the nil id, so the fallback simply matches nothing.
pub fn uuid_or_sentinel(value: &str) -> Uuid {
    Uuid::parse_str(value.trim()).unwrap_or(Uuid::nil())
}

/// ISO local date-time: `YYYY-MM-DDTHH:MM` with optional seconds and fraction.
pub fn parse_local_date_time(value: &str) -> Result<NaiveDateTime, ServiceError> {
    value
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|e| ServiceError::Validation(format!("{}: '{}' ({})", WRONG_DATE_FORMAT, value, e)))
}

pub fn parse(criteria: &FilterCriteria) -> Result<(RetrievalFilter, Pagination), ServiceError> {
    let created = criteria
        .created_date_time
        .as_deref()
        .map(parse_local_date_time)
        .transpose()?;
    let filter = RetrievalFilter {
        retrieved: criteria.retrieved,
        storage_id: criteria.storage_id.as_deref().map(uuid_or_sentinel),
        created,
    };
    Ok((filter, Pagination::new(criteria.offset, criteria.limit)))
}

/// Conjunction of one predicate per set field; an empty filter matches all rows.
pub fn condition(filter: &RetrievalFilter) -> Condition {
    let mut predicates = Vec::new();
    match filter.retrieved {
        Some(true) => predicates.push(Column::RetrievedDateTime.is_not_null()),
        Some(false) => predicates.push(Column::RetrievedDateTime.is_null()),
        None => {}
    }
    if let Some(storage_id) = filter.storage_id {
        predicates.push(Column::RemoteStorageId.eq(storage_id));
    }
    if let Some(created) = filter.created {
        predicates.push(Column::CreatedDateTime.eq(created));
    }
    predicates.into_iter().fold(Condition::all(), Condition::add)
}
