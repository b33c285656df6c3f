use rp_types::RequestId;

/// Errors from request store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Only requests with data sub-requests are retained.
    #[error("request {0} has no data requests to retain")]
    NothingToRetain(RequestId),

    /// A different body is already retained under this request ID.
    #[error("request {0} is already retained with a different body")]
    Conflict(RequestId),

    /// Storage backend is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
