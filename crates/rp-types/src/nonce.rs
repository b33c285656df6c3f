use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of random bytes in a nonce (96 bits).
pub const NONCE_LEN: usize = 12;

/// A single-use random value, rendered as lowercase hex.
///
/// Nonces are mixed into request-ID derivation and appended to ledger
/// transaction envelopes. They are generated by `rp_crypto::NonceSource`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(String);

impl Nonce {
    /// Build a nonce from raw random bytes.
    pub fn from_bytes(bytes: &[u8; NONCE_LEN]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse a nonce previously rendered with [`Nonce::as_str`].
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != NONCE_LEN {
            return Err(TypeError::InvalidLength {
                expected: NONCE_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.0)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_24_hex_chars() {
        let n = Nonce::from_bytes(&[0x5a; NONCE_LEN]);
        assert_eq!(n.as_str().len(), 24);
        assert_eq!(n.as_str(), "5a".repeat(12));
    }

    #[test]
    fn parse_roundtrip() {
        let n = Nonce::from_bytes(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(Nonce::parse(n.as_str()).unwrap(), n);
    }

    #[test]
    fn parse_rejects_short_input() {
        assert_eq!(
            Nonce::parse("00ff").unwrap_err(),
            TypeError::InvalidLength { expected: 12, actual: 2 }
        );
    }
}
