use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use rp_crypto::SecretKey;
use rp_gate::ValidationRules;
use rp_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable that overrides `node.secret_key`.
pub const SECRET_ENV: &str = "RP_SECRET_KEY";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_timeout_ms: u64,
    /// Extra broadcast attempts after a transport failure. 0 disables retry.
    pub broadcast_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_backoff_ms: u64,
}

impl ServerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8181)),
            shutdown_timeout_ms: 5_000,
            broadcast_retries: 0,
            retry_backoff_ms: 250,
        }
    }
}

/// Identity of this relying-party node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub secret_key: SecretKey,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            secret_key: SecretKey::new(""),
        }
    }
}

/// Complete node configuration, as read from a TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RpConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub node: NodeConfig,
    pub validation: ValidationRules,
}

impl RpConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read a config file, then apply the `RP_SECRET_KEY` override.
    ///
    /// Without a path, defaults are used and the secret must come from the
    /// environment.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ServerError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        Ok(config.with_secret_override(std::env::var(SECRET_ENV).ok()))
    }

    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.node.secret_key = SecretKey::new(secret);
        }
        self
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.node.secret_key.is_empty() {
            return Err(ServerError::Config(format!(
                "node.secret_key is empty (set it in the config file or {SECRET_ENV})"
            )));
        }
        if self.ledger.endpoint.trim().is_empty() {
            return Err(ServerError::Config("ledger.endpoint is empty".into()));
        }
        if self.ledger.broadcast_timeout_ms == 0 {
            return Err(ServerError::Config(
                "ledger.broadcast_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8181".parse::<SocketAddr>().unwrap());
        assert_eq!(c.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(c.broadcast_retries, 0);
    }

    #[test]
    fn parse_partial_file() {
        let c = RpConfig::from_toml_str(
            r#"
            [server]
            bind_addr = "0.0.0.0:9000"
            broadcast_retries = 2

            [ledger]
            endpoint = "http://ledger:26657"

            [node]
            secret_key = "RP_PrivateKey"

            [validation]
            max_assurance_level = 4
            "#,
        )
        .unwrap();
        assert_eq!(c.server.bind_addr.port(), 9000);
        assert_eq!(c.server.broadcast_retries, 2);
        assert_eq!(c.server.retry_backoff_ms, 250);
        assert_eq!(c.ledger.endpoint, "http://ledger:26657");
        assert_eq!(c.ledger.broadcast_timeout_ms, 10_000);
        assert_eq!(c.validation.max_assurance_level, 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = RpConfig::default().validate().unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn env_secret_overrides_file() {
        let c = RpConfig::from_toml_str("[node]\nsecret_key = \"from-file\"")
            .unwrap()
            .with_secret_override(Some("from-env".into()));
        assert_eq!(c.node.secret_key, SecretKey::new("from-env"));

        let kept = RpConfig::from_toml_str("[node]\nsecret_key = \"from-file\"")
            .unwrap()
            .with_secret_override(Some(String::new()));
        assert_eq!(kept.node.secret_key, SecretKey::new("from-file"));
    }

    #[test]
    fn serialized_config_hides_secret() {
        let c = RpConfig::default().with_secret_override(Some("hunter2".into()));
        let text = toml::to_string(&c).unwrap();
        assert!(!text.contains("hunter2"));
        assert!(text.contains("<redacted>"));
    }

    #[test]
    fn unknown_types_are_config_errors() {
        let err = RpConfig::from_toml_str("[server]\nbind_addr = 5").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
