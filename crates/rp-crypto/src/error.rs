/// Errors from hashing and derivation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashError {
    /// The payload could not be brought into canonical form.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The node secret cannot be used as a MAC key.
    #[error("invalid secret key: {0}")]
    InvalidKey(String),
}

/// Result alias for hashing operations.
pub type HashResult<T> = Result<T, HashError>;
