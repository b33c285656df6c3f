use async_trait::async_trait;
use serde::Deserialize;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::EncodedTransaction;

/// Commit path on the ledger node's RPC listener.
pub const BROADCAST_TX_COMMIT: &str = "/broadcast_tx_commit";

/// What happened to a broadcast transaction.
///
/// `TransportFailure` may be retried with the very same transaction: its
/// embedded nonce keeps it idempotent at the ledger. `Rejected` must not be
/// retried unmodified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitResult {
    /// The ledger accepted and committed the transaction.
    Committed { tx_hash: String, height: u64 },
    /// The ledger refused the transaction.
    Rejected { code: i64, reason: String },
    /// The ledger could not be reached or answered unintelligibly.
    TransportFailure { cause: String },
}

impl CommitResult {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Whether re-sending the identical transaction is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }
}

/// Delivers encoded transactions to the ledger.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submit once, without retrying, and report the outcome.
    async fn broadcast(&self, tx: &EncodedTransaction) -> CommitResult;
}

// ---------------------------------------------------------------------------
// Tendermint JSON-RPC response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BroadcastResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BroadcastResult {
    #[serde(default)]
    check_tx: TxOutcome,
    #[serde(default, alias = "tx_result")]
    deliver_tx: TxOutcome,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    height: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct TxOutcome {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    log: String,
}

fn parse_height(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Classify a `broadcast_tx_commit` response body.
///
/// A JSON-RPC `error` or a non-zero `check_tx`/`deliver_tx` code is a
/// rejection. A body that is not a JSON-RPC response at all is a transport
/// failure.
pub fn classify_response(body: &[u8]) -> CommitResult {
    let response: RpcResponse = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            return CommitResult::TransportFailure {
                cause: format!("undecodable ledger response: {e}"),
            }
        }
    };

    if let Some(err) = response.error {
        let detail = match err.data {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let reason = if detail.is_empty() {
            err.message
        } else {
            format!("{}: {detail}", err.message)
        };
        return CommitResult::Rejected {
            code: err.code,
            reason,
        };
    }

    let Some(result) = response.result else {
        return CommitResult::TransportFailure {
            cause: "ledger response has neither result nor error".into(),
        };
    };

    for (phase, outcome) in [("check_tx", &result.check_tx), ("deliver_tx", &result.deliver_tx)] {
        if outcome.code != 0 {
            return CommitResult::Rejected {
                code: outcome.code,
                reason: format!("{phase} failed: {}", outcome.log),
            };
        }
    }

    match parse_height(&result.height) {
        Some(height) => CommitResult::Committed {
            tx_hash: result.hash,
            height,
        },
        None => CommitResult::TransportFailure {
            cause: format!("ledger response has an invalid height: {}", result.height),
        },
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Broadcasts over the node's URI-over-HTTP RPC.
///
/// Issues `GET <endpoint>/broadcast_tx_commit?tx="<base64>"`. String
/// arguments on that interface are quoted; `reqwest` URL-encodes the rest.
#[derive(Clone, Debug)]
pub struct HttpBroadcastClient {
    client: reqwest::Client,
    url: String,
}

impl HttpBroadcastClient {
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.broadcast_timeout())
            .build()
            .map_err(|e| LedgerError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}{BROADCAST_TX_COMMIT}", config.endpoint.trim_end_matches('/')),
        })
    }

    /// Full URL of the commit endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Broadcaster for HttpBroadcastClient {
    async fn broadcast(&self, tx: &EncodedTransaction) -> CommitResult {
        tracing::debug!(url = %self.url, tx_len = tx.len(), "broadcasting transaction");

        // The URI-over-HTTP RPC takes byte arguments as 0x-prefixed hex or
        // as a double-quoted string; the base64 text is sent quoted.
        let quoted = format!("\"{}\"", tx.as_str());
        let response = match self.client.get(&self.url).query(&[("tx", quoted)]).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "ledger unreachable");
                return CommitResult::TransportFailure {
                    cause: e.to_string(),
                };
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                return CommitResult::TransportFailure {
                    cause: format!("failed to read ledger response: {e}"),
                }
            }
        };

        let outcome = classify_response(&body);
        // Error statuses carrying a JSON-RPC error are still the ledger's verdict.
        let outcome = match outcome {
            CommitResult::Committed { .. } if !status.is_success() => CommitResult::TransportFailure {
                cause: format!("ledger returned HTTP {status}"),
            },
            CommitResult::TransportFailure { cause } if !status.is_success() => {
                CommitResult::TransportFailure {
                    cause: format!("ledger returned HTTP {status}: {cause}"),
                }
            }
            other => other,
        };

        match &outcome {
            CommitResult::Committed { tx_hash, height } => {
                tracing::info!(%tx_hash, height, "transaction committed");
            }
            CommitResult::Rejected { code, reason } => {
                tracing::warn!(code, %reason, "transaction rejected by ledger");
            }
            CommitResult::TransportFailure { cause } => {
                tracing::warn!(%cause, "broadcast failed");
            }
        }
        outcome
    }
}
