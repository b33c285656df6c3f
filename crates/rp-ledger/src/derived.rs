use rp_crypto::ContentHasher;
use rp_types::{DataRequestItem, Digest, Request, RequestId};
use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;

/// Ledger-visible form of one data sub-request.
///
/// The parameters travel only as `request_params_hash`; answering services
/// receive the plain values off-ledger and check them against this digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedDataRequest {
    pub service_id: String,
    #[serde(rename = "as_id_list")]
    pub as_ids: Vec<String>,
    pub count: u32,
    pub request_params_hash: Digest,
}

impl DerivedDataRequest {
    pub fn from_item(item: &DataRequestItem, hasher: &ContentHasher) -> LedgerResult<Self> {
        Ok(Self {
            service_id: item.service_id.clone(),
            as_ids: item.as_ids.clone(),
            count: item.count,
            request_params_hash: hasher.digest(&item.request_params)?,
        })
    }
}

/// Canonical request payload submitted to the ledger as `CreateRequest`.
///
/// Carries the derived identifier, the thresholds copied from the request,
/// and digests in place of anything the ledger must not reveal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRequest {
    pub request_id: RequestId,
    pub min_ial: u32,
    pub min_aal: u32,
    pub min_idp: u32,
    pub timeout: u64,
    pub data_request_list: Vec<DerivedDataRequest>,
    pub message_hash: Digest,
}

impl DerivedRequest {
    /// Hash every sub-request's parameters and the request message.
    ///
    /// Any encoding failure aborts the whole derivation.
    pub fn from_request(
        request_id: RequestId,
        request: &Request,
        hasher: &ContentHasher,
    ) -> LedgerResult<Self> {
        let data_request_list = request
            .data_request_list
            .iter()
            .map(|item| DerivedDataRequest::from_item(item, hasher))
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(Self {
            request_id,
            min_ial: request.min_ial,
            min_aal: request.min_aal,
            min_idp: request.min_idp,
            timeout: request.timeout,
            data_request_list,
            message_hash: hasher.digest(&request.request_message)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_params(params: &[(&str, &str)]) -> Request {
        let mut item = DataRequestItem {
            service_id: "svc1".into(),
            as_ids: vec!["as1".into()],
            count: 1,
            ..Default::default()
        };
        for (k, v) in params {
            item.request_params.insert((*k).into(), (*v).into());
        }
        Request {
            reference_id: "ref-1".into(),
            request_message: "please confirm".into(),
            min_ial: 2,
            min_aal: 2,
            min_idp: 1,
            timeout: 600,
            data_request_list: vec![item],
            ..Default::default()
        }
    }

    fn rid() -> RequestId {
        RequestId::from_digest(Digest::from_hash([3; 32]))
    }

    #[test]
    fn copies_thresholds() {
        let req = request_with_params(&[("k", "v")]);
        let derived = DerivedRequest::from_request(rid(), &req, &ContentHasher).unwrap();
        assert_eq!(derived.request_id, rid());
        assert_eq!(derived.min_ial, 2);
        assert_eq!(derived.min_aal, 2);
        assert_eq!(derived.min_idp, 1);
        assert_eq!(derived.timeout, 600);
        assert_eq!(derived.data_request_list.len(), 1);
    }

    #[test]
    fn params_only_change_the_params_hash() {
        let a = DerivedRequest::from_request(rid(), &request_with_params(&[("k", "v")]), &ContentHasher)
            .unwrap();
        let b = DerivedRequest::from_request(rid(), &request_with_params(&[("k", "w")]), &ContentHasher)
            .unwrap();
        let (da, db) = (&a.data_request_list[0], &b.data_request_list[0]);
        assert_ne!(da.request_params_hash, db.request_params_hash);
        assert_eq!(da.service_id, db.service_id);
        assert_eq!(da.as_ids, db.as_ids);
        assert_eq!(da.count, db.count);
        assert_eq!(a.message_hash, b.message_hash);
    }

    #[test]
    fn message_hash_matches_hasher() {
        let req = request_with_params(&[]);
        let derived = DerivedRequest::from_request(rid(), &req, &ContentHasher).unwrap();
        assert_eq!(derived.message_hash, ContentHasher.digest("please confirm").unwrap());
    }

    #[test]
    fn payload_never_contains_raw_values() {
        let req = request_with_params(&[("citizen_secret", "4111-1111")]);
        let derived = DerivedRequest::from_request(rid(), &req, &ContentHasher).unwrap();
        let json = serde_json::to_string(&derived).unwrap();
        assert!(!json.contains("4111-1111"));
        assert!(!json.contains("citizen_secret"));
        assert!(!json.contains("please confirm"));
    }

    #[test]
    fn digests_serialize_as_hex() {
        let req = request_with_params(&[("k", "v")]);
        let derived = DerivedRequest::from_request(rid(), &req, &ContentHasher).unwrap();
        let value = serde_json::to_value(&derived).unwrap();
        let hash = value["data_request_list"][0]["request_params_hash"].as_str().unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(value["request_id"].as_str().unwrap(), rid().to_hex());
    }
}
