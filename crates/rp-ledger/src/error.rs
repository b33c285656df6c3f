use rp_crypto::HashError;

/// Errors produced while building or decoding transactions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Canonicalization or serialization failed. Fatal to the request.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An encoded transaction could not be taken apart again.
    #[error("malformed transaction: {0}")]
    Malformed(String),

    /// The broadcast client could not be set up.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<HashError> for LedgerError {
    fn from(err: HashError) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
