//! Request storage for the relying-party node.
//!
//! Two indexes back the request pipeline:
//!
//! - reference ID → [`RequestId`](rp_types::RequestId): the idempotency cache.
//!   A reference ID seen once keeps the request ID it was first given.
//! - request ID → [`RetainedRequest`]: the full body of every request that
//!   carries data sub-requests, kept for later retrieval.
//!
//! Alongside them, each derived request has a [`Delivery`]: its encoded
//! transaction while pending, then the ledger's verdict.
//!
//! # Storage Backends
//!
//! All backends implement the [`RequestStore`] trait:
//!
//! - [`InMemoryRequestStore`] -- `HashMap`-based store behind `RwLock`s
//!
//! # Design Rules
//!
//! 1. Entries are never overwritten; the first write wins. Deliveries settle
//!    once.
//! 2. Absence is a normal outcome, not an error.
//! 3. There is no eviction at this layer.

pub mod delivery;
pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use delivery::Delivery;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRequestStore;
pub use record::RetainedRequest;
pub use traits::RequestStore;
