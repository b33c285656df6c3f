use serde::Serialize;

/// Where a request's ledger transaction stands.
///
/// A delivery starts `Pending` with the encoded transaction and is settled
/// exactly once, by the first commit or rejection the ledger reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    /// Not yet confirmed. `tx` is the base64 transaction to resend.
    Pending { tx: String },
    Committed { tx_hash: String, height: u64 },
    Rejected { code: i64, reason: String },
}

impl Delivery {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }
}
