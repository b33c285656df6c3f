//! Cryptographic primitives for the relying-party node.
//!
//! Provides canonical-JSON SHA-256 hashing, keyed request-ID derivation, and
//! nonce generation. Every digest leaves this crate as a [`rp_types::Digest`],
//! which renders as lowercase hex wherever it is serialized.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod deriver;
pub mod error;
pub mod hasher;
pub mod nonce;

pub use deriver::{IdentifierDeriver, SecretKey};
pub use error::{HashError, HashResult};
pub use hasher::{canonical_json, ContentHasher};
pub use nonce::{NonceSource, OsNonceSource};
