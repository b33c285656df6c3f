use rp_types::{Request, RequestId};

use crate::delivery::Delivery;
use crate::error::StoreResult;
use crate::record::RetainedRequest;

/// Idempotency cache and request-body index.
///
/// All implementations must satisfy these invariants:
/// - A reference ID, once recorded, always maps to the same request ID.
/// - Nothing is ever overwritten. A second `record` for a known reference ID
///   returns the request ID that is already there.
/// - A delivery moves from `Pending` to a settled state once and then stays.
/// - `lookup` never fails; a miss is `None`.
/// - Implementations are shared across concurrent calls and must do their own
///   synchronisation.
pub trait RequestStore: Send + Sync {
    /// Request ID previously recorded for this reference ID, if any.
    fn lookup(&self, reference_id: &str) -> Option<RequestId>;

    /// Record the mapping and return the authoritative request ID.
    ///
    /// If the reference ID is already present the stored request ID is
    /// returned unchanged and `request_id` is discarded.
    fn record(&self, reference_id: &str, request_id: RequestId) -> StoreResult<RequestId>;

    /// Keep the full request body under its request ID.
    ///
    /// Only requests with at least one data sub-request are retained.
    /// Returns `true` if the body was newly stored, `false` if the identical
    /// body was already present.
    fn retain(&self, request_id: RequestId, request: &Request) -> StoreResult<bool>;

    /// Retained request body, if any.
    fn get(&self, request_id: &RequestId) -> StoreResult<Option<RetainedRequest>>;

    /// Start tracking the transaction for `request_id` as pending.
    ///
    /// Does nothing if a delivery is already tracked for it.
    fn begin_delivery(&self, request_id: RequestId, tx: &str) -> StoreResult<()>;

    /// Settle a pending delivery with the ledger's verdict.
    ///
    /// An already settled delivery is left unchanged. Returns the state held
    /// after the call, which is the earlier verdict if there was one.
    fn settle_delivery(&self, request_id: RequestId, verdict: Delivery) -> StoreResult<Delivery>;

    /// Delivery state of `request_id`, if tracked.
    fn delivery(&self, request_id: &RequestId) -> Option<Delivery>;
}
