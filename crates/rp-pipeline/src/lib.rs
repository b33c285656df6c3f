//! Request-issuance pipeline for the relying-party node.
//!
//! [`RequestPipeline::create`] is the one entry point the HTTP layer calls:
//!
//! 1. validate the path pair and the payload;
//! 2. take the per-reference-ID lock;
//! 3. return the recorded request ID if the reference ID is known;
//! 4. otherwise draw a nonce, derive the request ID, hash the sub-requests
//!    and encode the `CreateRequest` transaction;
//! 5. record the reference ID and retain the body;
//! 6. release the lock and broadcast.
//!
//! Steps 3–5 are atomic per reference ID, so concurrent callers sharing a
//! reference ID build and broadcast exactly one transaction between them.

pub mod error;
mod locks;
pub mod pipeline;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{CreateOutcome, CreateStatus, RequestPipeline};
