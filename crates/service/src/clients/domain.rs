//! Payloads returned by the inventory, users and circulation modules.
//!
//! Only the fields the retrieval queue reads are modelled; everything else in
//! the upstream JSON is ignored.

use serde::{Deserialize, Serialize};

/// Envelope of every collection endpoint: `{"<things>": [...], "totalRecords": n}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ResultList<T> {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default, alias = "items", alias = "instances", alias = "users", alias = "requests")]
    pub result: Vec<T>,
}

impl<T> ResultList<T> {
    /// First element, treating an empty list as "not there".
    pub fn into_first(self) -> Option<T> {
        self.result.into_iter().next()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveCallNumberComponents {
    pub call_number: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub barcode: Option<String>,
    pub instance_id: Option<String>,
    pub holdings_record_id: Option<String>,
    pub effective_location_id: Option<String>,
    pub effective_call_number_components: Option<EffectiveCallNumberComponents>,
}

impl Item {
    pub fn call_number(&self) -> Option<String> {
        self.effective_call_number_components
            .as_ref()
            .and_then(|c| c.call_number.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

impl Instance {
    /// Contributor names joined for display; unnamed contributors are dropped.
    pub fn authors(&self, separator: &str) -> String {
        self.contributors
            .iter()
            .filter_map(|c| c.name.as_deref())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub barcode: Option<String>,
    pub personal: Option<Personal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Hold,
    Recall,
    Page,
    #[serde(other)]
    Other,
}

impl RequestType {
    pub fn waits_for_item(self) -> bool {
        matches!(self, RequestType::Hold | RequestType::Recall)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorName {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedItem {
    pub holdings_record_id: Option<String>,
    pub barcode: Option<String>,
    pub title: Option<String>,
    pub call_number: Option<String>,
    #[serde(default)]
    pub contributor_names: Vec<ContributorName>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub barcode: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupServicePoint {
    pub name: Option<String>,
    pub pickup_location: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub request_type: RequestType,
    pub status: Option<String>,
    pub position: Option<i32>,
    pub patron_comments: Option<String>,
    pub item: Option<RequestedItem>,
    pub requester: Option<Requester>,
    pub pickup_service_point: Option<PickupServicePoint>,
}
