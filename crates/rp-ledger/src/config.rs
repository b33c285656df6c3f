use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how to reach the ledger node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Base URL of the node's RPC listener.
    pub endpoint: String,
    /// Upper bound on a single `broadcast_tx_commit` call.
    pub broadcast_timeout_ms: u64,
}

impl LedgerConfig {
    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_millis(self.broadcast_timeout_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:26657".into(),
            broadcast_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LedgerConfig::default();
        assert_eq!(c.endpoint, "http://127.0.0.1:26657");
        assert_eq!(c.broadcast_timeout(), Duration::from_secs(10));
    }
}
