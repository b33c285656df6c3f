//! HTTP server for the relying-party node.
//!
//! Accepts identity requests over REST, runs them through the
//! [`rp_pipeline::RequestPipeline`], and reports the derived request ID.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{NodeConfig, RpConfig, ServerConfig, SECRET_ENV};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::{CreateResponse, DeliveryStatus, HealthResponse};
pub use server::RpServer;
pub use state::{AppState, RetryPolicy};
