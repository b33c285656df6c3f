use std::future::IntoFuture;
use std::sync::Arc;

use rp_gate::RuleValidator;
use rp_ledger::HttpBroadcastClient;
use rp_pipeline::RequestPipeline;
use rp_store::InMemoryRequestStore;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::RpConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::{AppState, RetryPolicy};

/// Relying-party node server.
pub struct RpServer {
    config: RpConfig,
}

impl RpServer {
    /// Fails if the configuration is unusable.
    pub fn new(config: RpConfig) -> ServerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RpConfig {
        &self.config
    }

    /// Wire the store, validator, ledger client and pipeline together.
    pub fn build_state(&self) -> ServerResult<AppState> {
        let store = Arc::new(InMemoryRequestStore::new());
        let broadcaster = HttpBroadcastClient::new(&self.config.ledger)?;
        let pipeline = RequestPipeline::new(
            self.config.node.secret_key.clone(),
            store.clone(),
            Arc::new(RuleValidator::new(self.config.validation.clone())),
            Arc::new(broadcaster),
        );
        Ok(AppState::new(
            Arc::new(pipeline),
            store,
            RetryPolicy::from_config(&self.config.server),
        ))
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> ServerResult<axum::Router> {
        Ok(build_router(self.build_state()?))
    }

    /// Serve until Ctrl-C, then let in-flight requests finish within the
    /// configured drain timeout.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router()?;
        let addr = self.config.server.bind_addr;
        let drain = self.config.server.shutdown_timeout();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            ledger = %self.config.ledger.endpoint,
            "rp node listening"
        );

        let stopping = Arc::new(Notify::new());
        let signal = {
            let stopping = Arc::clone(&stopping);
            async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "cannot listen for shutdown signal");
                    std::future::pending::<()>().await;
                }
                tracing::info!(drain_ms = drain.as_millis() as u64, "shutting down");
                stopping.notify_one();
            }
        };

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .into_future();
        tokio::select! {
            result = server => result.map_err(|e| ServerError::Internal(e.to_string())),
            _ = async {
                stopping.notified().await;
                tokio::time::sleep(drain).await;
            } => {
                tracing::warn!("drain timeout elapsed, dropping open connections");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rp_crypto::SecretKey;

    use super::*;

    fn config() -> RpConfig {
        let mut c = RpConfig::default();
        c.node.secret_key = SecretKey::new("RP_PrivateKey");
        c
    }

    #[test]
    fn server_construction() {
        let server = RpServer::new(config()).unwrap();
        assert_eq!(server.config().server.bind_addr.port(), 8181);
    }

    #[test]
    fn missing_secret_is_refused() {
        assert!(matches!(
            RpServer::new(RpConfig::default()),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn router_builds() {
        let server = RpServer::new(config()).unwrap();
        assert!(server.router().is_ok());
    }
}
