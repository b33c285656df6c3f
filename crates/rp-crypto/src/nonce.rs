use rand::rngs::OsRng;
use rand::RngCore;
use rp_types::{Nonce, NONCE_LEN};

/// Source of fresh nonces.
///
/// The pipeline takes this as a trait object so tests can observe whether a
/// nonce was requested at all (duplicate reference IDs must never get one).
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> Nonce;
}

/// Nonce source backed by the operating system RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn next_nonce(&self) -> Nonce {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Nonce::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn nonces_are_hex_of_expected_length() {
        let n = OsNonceSource.next_nonce();
        assert_eq!(n.as_str().len(), NONCE_LEN * 2);
        assert!(n.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn nonces_do_not_repeat() {
        let seen: HashSet<_> = (0..1000).map(|_| OsNonceSource.next_nonce()).collect();
        assert_eq!(seen.len(), 1000);
    }
}
