use std::fmt;

use hmac::{Hmac, Mac};
use rp_types::{Digest, Nonce, Request, RequestId};
use serde::{Deserialize, Serialize, Serializer};
use sha2::Sha256;

use crate::error::{HashError, HashResult};
use crate::hasher::canonical_json;

type HmacSha256 = Hmac<Sha256>;

/// The node's request-signing secret.
///
/// Only ever used as a MAC key. It can be read from configuration, but both
/// its `Debug` output and its serialized form are redacted.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

const REDACTED: &str = "<redacted>";

/// Derives request identifiers.
///
/// `id = HMAC-SHA-256(secret, domain || 0x00 || nonce || 0x00 || canonical_json(request))`
///
/// The same secret, nonce and request always give the same ID. The secret
/// never appears in the output except through the MAC.
#[derive(Clone, Copy, Debug)]
pub struct IdentifierDeriver {
    domain: &'static str,
}

impl IdentifierDeriver {
    /// Derivation tag for request identifiers.
    pub const REQUEST_ID: Self = Self {
        domain: "rp-request-id-v1",
    };

    /// Create a deriver with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    pub fn derive(
        &self,
        secret: &SecretKey,
        nonce: &Nonce,
        request: &Request,
    ) -> HashResult<RequestId> {
        let body = canonical_json(request)?;
        let mut mac = HmacSha256::new_from_slice(secret.expose())
            .map_err(|e| HashError::InvalidKey(e.to_string()))?;
        mac.update(self.domain.as_bytes());
        mac.update(&[0]);
        mac.update(nonce.as_bytes());
        mac.update(&[0]);
        mac.update(&body);
        let out: [u8; 32] = mac.finalize().into_bytes().into();
        Ok(RequestId::from_digest(Digest::from_hash(out)))
    }

    /// The domain tag used by this deriver.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

impl Default for IdentifierDeriver {
    fn default() -> Self {
        Self::REQUEST_ID
    }
}
