//! Foundation types for the relying-party (RP) node.
//!
//! Every other RP crate depends on `rp-types`. The types here describe what a
//! caller asks for ([`Request`]) and the fixed-size values the pipeline derives
//! from it ([`Digest`], [`RequestId`], [`Nonce`]).
//!
//! # Key Types
//!
//! - [`Request`]: caller-supplied verification request
//! - [`DataRequestItem`]: one attribute/data sub-request inside a [`Request`]
//! - [`Digest`]: 256-bit content hash, always rendered as lowercase hex
//! - [`RequestId`]: deterministic, content-derived request identifier
//! - [`Nonce`]: single-use random value mixed into derivations and envelopes

pub mod digest;
pub mod error;
pub mod nonce;
pub mod request;

pub use digest::{Digest, RequestId, DIGEST_LEN};
pub use error::TypeError;
pub use nonce::{Nonce, NONCE_LEN};
pub use request::{DataRequestItem, Request};
