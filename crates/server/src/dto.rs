//! Wire shapes of the retrieval queue API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use models::retrieval_queue;
use service::retrieval::domain::RetrievalPage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalQueue {
    pub id: Uuid,
    pub hold_id: Option<String>,
    pub item_barcode: Option<String>,
    pub instance_title: Option<String>,
    pub instance_author: Option<String>,
    pub call_number: Option<String>,
    pub patron_barcode: Option<String>,
    pub patron_name: Option<String>,
    pub retrieved_date_time: Option<NaiveDateTime>,
    pub pickup_location: Option<String>,
    pub request_status: Option<String>,
    pub request_note: Option<String>,
    pub created_date_time: NaiveDateTime,
    pub remote_storage_id: Uuid,
}

impl From<retrieval_queue::Model> for RetrievalQueue {
    fn from(m: retrieval_queue::Model) -> Self {
        Self {
            id: m.id,
            hold_id: m.hold_id,
            item_barcode: m.item_barcode,
            instance_title: m.instance_title,
            instance_author: m.instance_author,
            call_number: m.call_number,
            patron_barcode: m.patron_barcode,
            patron_name: m.patron_name,
            retrieved_date_time: m.retrieved_date_time,
            pickup_location: m.pickup_location,
            request_status: m.request_status,
            request_note: m.request_note,
            created_date_time: m.created_date_time,
            remote_storage_id: m.remote_storage_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalQueues {
    pub retrievals: Vec<RetrievalQueue>,
    pub total_records: u64,
}

impl From<RetrievalPage> for RetrievalQueues {
    fn from(page: RetrievalPage) -> Self {
        Self {
            retrievals: page.records.into_iter().map(RetrievalQueue::from).collect(),
            total_records: page.total_records,
        }
    }
}

/// Request body of the return endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInItemDoc {
    pub item_barcode: String,
    pub service_point_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnItemResponseDoc {
    #[serde(rename = "isHoldRecallRequestExist")]
    pub is_hold_recall_request_exist: bool,
}

/// Flat form of an item moved event. Circulation request events wrapped in
/// `{"data": {"new": ...}}` are accepted too.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovedEventDoc {
    pub hold_id: Option<String>,
    pub item_bar_code: Option<String>,
    pub requester_id: Option<String>,
    pub pickup_service_point_id: Option<String>,
    pub request_status: Option<String>,
    pub request_note: Option<String>,
    pub item_status_name: Option<String>,
}

/// `true` for the canonical `8-4-4-4-12` hex form of an RFC 4122 UUID,
/// versions 1 to 5.
pub fn is_canonical_uuid(value: &str) -> bool {
    let shape_ok = value.len() == 36
        && value.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        });
    if !shape_ok {
        return false;
    }
    match Uuid::try_parse(value) {
        Ok(id) => matches!(id.get_version_num(), 1..=5) && id.get_variant() == uuid::Variant::RFC4122,
        Err(_) => false,
    }
}
