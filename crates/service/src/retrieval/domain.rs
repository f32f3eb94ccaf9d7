use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use models::retrieval_queue;

use crate::errors::ServiceError;

/// Item status that marks a move event as a page request.
pub const PAGED_STATUS: &str = "Paged";

/// Raw list criteria as they arrive from the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub retrieved: Option<bool>,
    pub storage_id: Option<String>,
    pub created_date_time: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// Parsed form of [`FilterCriteria`]; every `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalFilter {
    pub retrieved: Option<bool>,
    pub storage_id: Option<Uuid>,
    pub created: Option<NaiveDateTime>,
}

impl RetrievalFilter {
    pub fn matches(&self, record: &retrieval_queue::Model) -> bool {
        self.retrieved.map_or(true, |r| record.is_retrieved() == r)
            && self.storage_id.map_or(true, |s| record.remote_storage_id == s)
            && self.created.map_or(true, |c| record.created_date_time == c)
    }
}

/// How a waiting record is addressed when staff confirm a retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    Id(Uuid),
    Barcode(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalPage {
    pub records: Vec<retrieval_queue::Model>,
    pub total_records: u64,
}

/// Notification that an item changed location, reduced to what the queue needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedEventRequest {
    pub hold_id: Option<String>,
    #[serde(rename = "itemBarCode", alias = "itemBarcode")]
    pub item_bar_code: Option<String>,
    pub requester_id: Option<String>,
    pub pickup_service_point_id: Option<String>,
    pub request_status: Option<String>,
    pub request_note: Option<String>,
    pub item_status_name: Option<String>,
}

impl MovedEventRequest {
    pub fn is_paged(&self) -> bool {
        self.item_status_name.as_deref() == Some(PAGED_STATUS)
    }

    /// Decode a message from the messaging layer.
    ///
    /// Circulation request events (`{"data": {"new": <request>}}`) are read
    /// leniently: a missing path leaves the field empty. Anything else must
    /// already be a flat `MovedEventRequest` object.
    pub fn from_event(event: &Value) -> Result<Self, ServiceError> {
        if let Some(request) = event.pointer("/data/new") {
            let text = |path: &str| request.pointer(path).and_then(Value::as_str).map(str::to_string);
            return Ok(Self {
                hold_id: text("/id"),
                item_bar_code: text("/item/barcode"),
                requester_id: text("/requesterId"),
                pickup_service_point_id: text("/pickupServicePointId"),
                request_status: text("/status"),
                request_note: text("/patronComments"),
                item_status_name: text("/item/status"),
            });
        }
        serde_json::from_value(event.clone())
            .map_err(|e| ServiceError::Validation(format!("unreadable item moved event: {}", e)))
    }
}
