//! Ledger-facing side of the relying-party node.
//!
//! This crate turns a validated [`Request`](rp_types::Request) into what the
//! ledger sees and delivers it:
//!
//! - [`DerivedRequest`]: the canonical, ledger-visible form of a request.
//!   Parameters and the request message appear only as digests.
//! - [`TransactionBuilder`]: wraps a payload into the
//!   `"<function>|<canonical json>|<nonce>"` envelope and base64-encodes it.
//! - [`Broadcaster`] / [`HttpBroadcastClient`]: submits the encoded
//!   transaction to the node's `broadcast_tx_commit` endpoint and classifies
//!   the answer as a [`CommitResult`].

pub mod broadcast;
pub mod config;
pub mod derived;
pub mod error;
pub mod transaction;

pub use broadcast::{classify_response, Broadcaster, CommitResult, HttpBroadcastClient};
pub use config::LedgerConfig;
pub use derived::{DerivedDataRequest, DerivedRequest};
pub use error::{LedgerError, LedgerResult};
pub use transaction::{
    DecodedTransaction, EncodedTransaction, TransactionBuilder, CREATE_REQUEST, TX_DELIMITER,
};
