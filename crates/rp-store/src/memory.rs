use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rp_types::{Request, RequestId};

use crate::delivery::Delivery;
use crate::error::{StoreError, StoreResult};
use crate::record::RetainedRequest;
use crate::traits::RequestStore;

/// In-memory, HashMap-based request store.
///
/// Every index sits behind its own `RwLock`. Each update is a single map
/// operation, so a panic while a lock is held cannot leave a map
/// half-updated; a poisoned lock is therefore recovered rather than
/// propagated.
pub struct InMemoryRequestStore {
    refs: RwLock<HashMap<String, RequestId>>,
    requests: RwLock<HashMap<RequestId, RetainedRequest>>,
    deliveries: RwLock<HashMap<RequestId, Delivery>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryRequestStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            refs: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
            deliveries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of reference IDs recorded.
    pub fn len(&self) -> usize {
        read(&self.refs).len()
    }

    /// Returns `true` if no reference ID has been recorded.
    pub fn is_empty(&self) -> bool {
        read(&self.refs).is_empty()
    }

    /// Number of request bodies retained.
    pub fn retained_count(&self) -> usize {
        read(&self.requests).len()
    }

    /// Number of transactions not yet confirmed by the ledger.
    pub fn pending_count(&self) -> usize {
        read(&self.deliveries).values().filter(|d| d.is_pending()).count()
    }
}

impl Default for InMemoryRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestStore for InMemoryRequestStore {
    fn lookup(&self, reference_id: &str) -> Option<RequestId> {
        read(&self.refs).get(reference_id).copied()
    }

    fn record(&self, reference_id: &str, request_id: RequestId) -> StoreResult<RequestId> {
        let mut refs = write(&self.refs);
        match refs.entry(reference_id.to_string()) {
            Entry::Occupied(existing) => {
                if *existing.get() != request_id {
                    tracing::debug!(
                        reference_id,
                        kept = %existing.get(),
                        discarded = %request_id,
                        "reference already recorded"
                    );
                }
                Ok(*existing.get())
            }
            Entry::Vacant(slot) => {
                slot.insert(request_id);
                Ok(request_id)
            }
        }
    }

    fn retain(&self, request_id: RequestId, request: &Request) -> StoreResult<bool> {
        if !request.has_data_requests() {
            return Err(StoreError::NothingToRetain(request_id));
        }
        let mut requests = write(&self.requests);
        match requests.entry(request_id) {
            Entry::Occupied(existing) if existing.get().request == *request => Ok(false),
            Entry::Occupied(_) => Err(StoreError::Conflict(request_id)),
            Entry::Vacant(slot) => {
                slot.insert(RetainedRequest::new(request.clone()));
                Ok(true)
            }
        }
    }

    fn get(&self, request_id: &RequestId) -> StoreResult<Option<RetainedRequest>> {
        Ok(read(&self.requests).get(request_id).cloned())
    }

    fn begin_delivery(&self, request_id: RequestId, tx: &str) -> StoreResult<()> {
        write(&self.deliveries)
            .entry(request_id)
            .or_insert_with(|| Delivery::Pending { tx: tx.to_string() });
        Ok(())
    }

    fn settle_delivery(&self, request_id: RequestId, verdict: Delivery) -> StoreResult<Delivery> {
        let mut deliveries = write(&self.deliveries);
        match deliveries.entry(request_id) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_pending() {
                    slot.insert(verdict);
                } else {
                    tracing::debug!(%request_id, "delivery already settled");
                }
                Ok(slot.get().clone())
            }
            Entry::Vacant(slot) => Ok(slot.insert(verdict).clone()),
        }
    }

    fn delivery(&self, request_id: &RequestId) -> Option<Delivery> {
        read(&self.deliveries).get(request_id).cloned()
    }
}

impl std::fmt::Debug for InMemoryRequestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRequestStore")
            .field("reference_count", &self.len())
            .field("retained_count", &self.retained_count())
            .field("pending_count", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use rp_crypto::ContentHasher;
    use rp_types::DataRequestItem;

    use super::*;

    fn id(seed: &str) -> RequestId {
        RequestId::from_digest(ContentHasher.digest_bytes(seed.as_bytes()))
    }

    fn request_with_items(reference_id: &str) -> Request {
        Request {
            reference_id: reference_id.into(),
            data_request_list: vec![DataRequestItem {
                service_id: "svc1".into(),
                count: 1,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn lookup_miss_is_none() {
        let store = InMemoryRequestStore::new();
        assert!(store.lookup("ref-1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn record_then_lookup() {
        let store = InMemoryRequestStore::new();
        let rid = id("a");
        assert_eq!(store.record("ref-1", rid).unwrap(), rid);
        assert_eq!(store.lookup("ref-1"), Some(rid));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn record_never_overwrites() {
        let store = InMemoryRequestStore::new();
        let first = id("first");
        store.record("ref-1", first).unwrap();
        let returned = store.record("ref-1", id("second")).unwrap();
        assert_eq!(returned, first);
        assert_eq!(store.lookup("ref-1"), Some(first));
    }

    #[test]
    fn retain_and_get() {
        let store = InMemoryRequestStore::new();
        let rid = id("body");
        let req = request_with_items("ref-1");
        assert!(store.retain(rid, &req).unwrap());
        let got = store.get(&rid).unwrap().unwrap();
        assert_eq!(got.request, req);
        assert_eq!(got.reference_id, "ref-1");
    }

    #[test]
    fn retain_is_idempotent_for_same_body() {
        let store = InMemoryRequestStore::new();
        let rid = id("body");
        let req = request_with_items("ref-1");
        assert!(store.retain(rid, &req).unwrap());
        assert!(!store.retain(rid, &req).unwrap());
        assert_eq!(store.retained_count(), 1);
    }

    #[test]
    fn retain_rejects_different_body() {
        let store = InMemoryRequestStore::new();
        let rid = id("body");
        store.retain(rid, &request_with_items("ref-1")).unwrap();
        let err = store.retain(rid, &request_with_items("ref-2")).unwrap_err();
        assert_eq!(err, StoreError::Conflict(rid));
        assert_eq!(store.get(&rid).unwrap().unwrap().reference_id, "ref-1");
    }

    #[test]
    fn retain_requires_data_requests() {
        let store = InMemoryRequestStore::new();
        let rid = id("empty");
        let err = store.retain(rid, &Request::default()).unwrap_err();
        assert_eq!(err, StoreError::NothingToRetain(rid));
        assert!(store.get(&rid).unwrap().is_none());
    }

    #[test]
    fn delivery_begins_pending_once() {
        let store = InMemoryRequestStore::new();
        let rid = id("tx");
        assert!(store.delivery(&rid).is_none());
        store.begin_delivery(rid, "Zmlyc3Q=").unwrap();
        store.begin_delivery(rid, "c2Vjb25k").unwrap();
        assert_eq!(
            store.delivery(&rid),
            Some(Delivery::Pending { tx: "Zmlyc3Q=".into() })
        );
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn first_verdict_wins() {
        let store = InMemoryRequestStore::new();
        let rid = id("tx");
        store.begin_delivery(rid, "eA==").unwrap();
        let committed = Delivery::Committed {
            tx_hash: "AB".into(),
            height: 3,
        };
        assert_eq!(store.settle_delivery(rid, committed.clone()).unwrap(), committed);

        let late = Delivery::Rejected {
            code: 19,
            reason: "tx already exists in cache".into(),
        };
        assert_eq!(store.settle_delivery(rid, late).unwrap(), committed);
        assert_eq!(store.delivery(&rid), Some(committed));
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn concurrent_records_agree_on_one_id() {
        let store = Arc::new(InMemoryRequestStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.record("shared", id(&i.to_string())).unwrap())
            })
            .collect();
        let results: Vec<RequestId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|r| *r == results[0]));
        assert_eq!(store.lookup("shared"), Some(results[0]));
    }
}
