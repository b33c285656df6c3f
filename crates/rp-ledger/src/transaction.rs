use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rp_crypto::{canonical_json, NonceSource, OsNonceSource};
use rp_types::Nonce;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::derived::DerivedRequest;
use crate::error::{LedgerError, LedgerResult};

/// Ledger function that registers a new request.
pub const CREATE_REQUEST: &str = "CreateRequest";

/// Separator between function name, payload and nonce.
pub const TX_DELIMITER: char = '|';

/// A base64-encoded transaction, ready for the `tx` query parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedTransaction(String);

impl EncodedTransaction {
    /// Wrap an already-encoded transaction (e.g. one read from the CLI).
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EncodedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedTransaction({} bytes)", self.0.len())
    }
}

impl fmt::Display for EncodedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An envelope taken apart again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub function: String,
    /// Canonical JSON payload exactly as it was encoded.
    pub payload: String,
    pub nonce: Nonce,
}

impl DecodedTransaction {
    /// Parse the payload back into a typed value.
    pub fn payload_as<T: DeserializeOwned>(&self) -> LedgerResult<T> {
        serde_json::from_str(&self.payload).map_err(|e| LedgerError::Malformed(e.to_string()))
    }
}

/// Builds ledger transaction envelopes.
///
/// Envelope layout before encoding: `"<function>|<canonical json>|<nonce>"`.
/// Each envelope gets its own nonce so two otherwise identical payloads
/// still hash to different ledger transactions.
#[derive(Clone)]
pub struct TransactionBuilder {
    nonces: Arc<dyn NonceSource>,
}

impl TransactionBuilder {
    pub fn new(nonces: Arc<dyn NonceSource>) -> Self {
        Self { nonces }
    }

    /// Encode a `CreateRequest` transaction.
    pub fn build(&self, request: &DerivedRequest) -> LedgerResult<EncodedTransaction> {
        self.build_call(CREATE_REQUEST, request)
    }

    /// Encode a call to an arbitrary ledger function.
    pub fn build_call<T: Serialize + ?Sized>(
        &self,
        function: &str,
        payload: &T,
    ) -> LedgerResult<EncodedTransaction> {
        if function.is_empty() || function.contains(TX_DELIMITER) {
            return Err(LedgerError::Encoding(format!(
                "invalid function name {function:?}"
            )));
        }
        let body = canonical_json(payload)?;
        let nonce = self.nonces.next_nonce();

        let mut raw = Vec::with_capacity(function.len() + body.len() + nonce.as_str().len() + 2);
        raw.extend_from_slice(function.as_bytes());
        raw.push(TX_DELIMITER as u8);
        raw.extend_from_slice(&body);
        raw.push(TX_DELIMITER as u8);
        raw.extend_from_slice(nonce.as_bytes());

        Ok(EncodedTransaction(STANDARD.encode(raw)))
    }

    /// Take an encoded transaction apart.
    ///
    /// Splits on the first and last delimiter: function names and nonces
    /// never contain one, but JSON string values may.
    pub fn decode(tx: &EncodedTransaction) -> LedgerResult<DecodedTransaction> {
        let raw = STANDARD
            .decode(tx.as_str())
            .map_err(|e| LedgerError::Malformed(format!("base64: {e}")))?;
        let text = String::from_utf8(raw)
            .map_err(|e| LedgerError::Malformed(format!("utf-8: {e}")))?;

        let (function, rest) = text
            .split_once(TX_DELIMITER)
            .ok_or_else(|| LedgerError::Malformed("missing function delimiter".into()))?;
        let (payload, nonce) = rest
            .rsplit_once(TX_DELIMITER)
            .ok_or_else(|| LedgerError::Malformed("missing nonce delimiter".into()))?;
        let nonce = Nonce::parse(nonce).map_err(|e| LedgerError::Malformed(format!("nonce: {e}")))?;

        Ok(DecodedTransaction {
            function: function.to_string(),
            payload: payload.to_string(),
            nonce,
        })
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new(Arc::new(OsNonceSource))
    }
}

impl fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionBuilder").finish_non_exhaustive()
    }
}
