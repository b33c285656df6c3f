use rp_crypto::HashError;
use rp_gate::ValidationError;
use rp_ledger::{EncodedTransaction, LedgerError};
use rp_store::StoreError;
use rp_types::RequestId;

/// Everything `create` can fail with. Each kind calls for different handling
/// by the caller, so none of them are folded together.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Malformed path parameters or payload. Never retried.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Canonicalization failed before anything left the process.
    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// No transaction is tracked for this request ID.
    #[error("unknown request {0}")]
    UnknownRequest(RequestId),

    /// The ledger refused the transaction. Do not resend it unmodified.
    #[error("ledger rejected request {request_id} (code {code}): {reason}")]
    Rejected {
        request_id: RequestId,
        code: i64,
        reason: String,
    },

    /// The ledger was unreachable. `tx` can be resent as is.
    #[error("broadcast of request {request_id} failed: {cause}")]
    Transport {
        request_id: RequestId,
        cause: String,
        tx: EncodedTransaction,
    },
}

impl From<HashError> for PipelineError {
    fn from(err: HashError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<LedgerError> for PipelineError {
    fn from(err: LedgerError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl PipelineError {
    /// Request ID already derived for the failed call, if it got that far.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Rejected { request_id, .. }
            | Self::Transport { request_id, .. }
            | Self::UnknownRequest(request_id) => Some(*request_id),
            _ => None,
        }
    }
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
