use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A verification request as submitted by a relying party's client.
///
/// Field names match the JSON body accepted by the create endpoint. Missing
/// fields decode to their empty/zero value; whether that is acceptable is the
/// validator's call, not the decoder's.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Caller-chosen deduplication key.
    pub reference_id: String,
    /// Identity providers allowed to answer. Empty means "any".
    pub idp_list: Vec<String>,
    pub callback_url: String,
    /// Attribute sub-requests, in caller order.
    pub data_request_list: Vec<DataRequestItem>,
    /// Free-text message shown to the user. Only its hash reaches the ledger.
    pub request_message: String,
    pub min_ial: u32,
    pub min_aal: u32,
    /// Minimum number of IdPs that must respond.
    pub min_idp: u32,
    pub request_timeout: u64,
    pub timeout: u64,
}

impl Request {
    /// Whether the request carries any data sub-requests worth retaining.
    pub fn has_data_requests(&self) -> bool {
        !self.data_request_list.is_empty()
    }
}

/// A single attribute/data sub-request addressed to answering services.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRequestItem {
    pub service_id: String,
    #[serde(rename = "as_id_list")]
    pub as_ids: Vec<String>,
    /// Number of AS responses required.
    pub count: u32,
    /// Parameters forwarded to the AS. Keys are unique and kept sorted.
    pub request_params: BTreeMap<String, String>,
}
