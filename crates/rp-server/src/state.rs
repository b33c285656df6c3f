use std::sync::Arc;
use std::time::Duration;

use rp_pipeline::{CreateOutcome, PipelineError, PipelineResult, RequestPipeline};
use rp_store::InMemoryRequestStore;
use rp_types::{Request, RequestId};

use crate::config::ServerConfig;

/// Caller-side retry policy for transport failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const NONE: Self = Self {
        retries: 0,
        backoff: Duration::ZERO,
    };

    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            retries: config.broadcast_retries,
            backoff: config.retry_backoff(),
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RequestPipeline>,
    store: Arc<InMemoryRequestStore>,
    retry: RetryPolicy,
}

impl AppState {
    /// `store` must be the same store the pipeline was built with.
    pub fn new(
        pipeline: Arc<RequestPipeline>,
        store: Arc<InMemoryRequestStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            pipeline,
            store,
            retry,
        }
    }

    pub fn pipeline(&self) -> &Arc<RequestPipeline> {
        &self.pipeline
    }

    pub fn store(&self) -> &InMemoryRequestStore {
        &self.store
    }

    /// Run `create`, resending the same transaction on transport failure
    /// according to the retry policy.
    pub async fn create_with_retry(
        &self,
        namespace: &str,
        identifier: &str,
        request: Request,
    ) -> PipelineResult<CreateOutcome> {
        let result = self.pipeline.create(namespace, identifier, request).await;
        self.retry_transport(result).await
    }

    /// Resend a pending transaction, with the same retry policy.
    pub async fn resume_with_retry(&self, request_id: RequestId) -> PipelineResult<CreateOutcome> {
        let result = self.pipeline.resume_broadcast(request_id).await;
        self.retry_transport(result).await
    }

    async fn retry_transport(
        &self,
        mut result: PipelineResult<CreateOutcome>,
    ) -> PipelineResult<CreateOutcome> {
        let mut attempt = 0;
        let mut delay = self.retry.backoff;
        loop {
            match result {
                Err(PipelineError::Transport {
                    request_id,
                    cause,
                    tx,
                }) if attempt < self.retry.retries => {
                    attempt += 1;
                    tracing::warn!(
                        %request_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %cause,
                        "broadcast failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    result = self.pipeline.retry_broadcast(request_id, tx).await;
                }
                other => return other,
            }
        }
    }
}
