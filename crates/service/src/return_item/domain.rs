use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item handed back to a remote storage facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInItem {
    pub item_barcode: String,
    #[serde(default)]
    pub service_point_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItemResponse {
    #[serde(rename = "isHoldRecallRequestExist")]
    pub hold_or_recall_exists: bool,
    /// Queue record written for the first waiting request; not part of the wire format.
    #[serde(skip)]
    pub queued_record: Option<Uuid>,
}
