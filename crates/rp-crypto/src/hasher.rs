use rp_types::Digest;
use sha2::{Digest as _, Sha256};

use crate::error::{HashError, HashResult};

/// Encode a value as canonical JSON bytes.
///
/// The value is first lifted into a `serde_json::Value`, whose objects keep
/// their keys sorted, and then written compactly. Struct fields, map entries
/// and nested objects therefore always come out in the same order no matter
/// how the source type orders them.
///
/// Serialization failures are returned, never papered over with an empty
/// buffer.
pub fn canonical_json<T: serde::Serialize + ?Sized>(value: &T) -> HashResult<Vec<u8>> {
    let value = serde_json::to_value(value).map_err(|e| HashError::Encoding(e.to_string()))?;
    serde_json::to_vec(&value).map_err(|e| HashError::Encoding(e.to_string()))
}

/// SHA-256 content hasher over canonical JSON.
///
/// Digests produced here end up in ledger payloads (parameter fingerprints,
/// message hashes) where answering services recompute them, so no domain tag
/// is mixed in: the digest is exactly `sha256(canonical_json(payload))`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub const fn new() -> Self {
        Self
    }

    /// Hash a serializable payload.
    pub fn digest<T: serde::Serialize + ?Sized>(&self, payload: &T) -> HashResult<Digest> {
        let bytes = canonical_json(payload)?;
        Ok(self.digest_bytes(&bytes))
    }

    /// Hash bytes that are already in their final encoding.
    pub fn digest_bytes(&self, data: &[u8]) -> Digest {
        Digest::from_hash(Sha256::digest(data).into())
    }

    /// Check a payload against a previously computed digest.
    pub fn verify<T: serde::Serialize + ?Sized>(
        &self,
        payload: &T,
        expected: &Digest,
    ) -> HashResult<bool> {
        Ok(self.digest(payload)? == *expected)
    }
}
