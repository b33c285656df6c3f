use chrono::{DateTime, Utc};
use rp_types::Request;
use serde::Serialize;

/// A request body kept for later retrieval, with the reference ID it was
/// submitted under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RetainedRequest {
    pub reference_id: String,
    pub request: Request,
    pub created_at: DateTime<Utc>,
}

impl RetainedRequest {
    pub fn new(request: Request) -> Self {
        Self {
            reference_id: request.reference_id.clone(),
            request,
            created_at: Utc::now(),
        }
    }
}
