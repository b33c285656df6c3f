use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use rp_pipeline::{CreateOutcome, CreateStatus};
use rp_store::{Delivery, RetainedRequest};
use rp_types::{Request, RequestId};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// Plain liveness check.
pub async fn root_handler() -> &'static str {
    "ok"
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "rp-node",
        "version": env!("CARGO_PKG_VERSION"),
        "references": state.store().len(),
        "retained": state.store().retained_count(),
        "pending": state.store().pending_count(),
    }))
}

/// Ledger state reported for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Committed,
    /// Not confirmed yet; resend `tx` through the broadcast route.
    Pending,
}

/// Body of a successful create or broadcast call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub request_id: RequestId,
    pub duplicate: bool,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<String>,
}

impl CreateResponse {
    /// 200 once committed, 202 while the transaction is pending.
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            DeliveryStatus::Committed => StatusCode::OK,
            DeliveryStatus::Pending => StatusCode::ACCEPTED,
        }
    }
}

impl From<CreateOutcome> for CreateResponse {
    fn from(outcome: CreateOutcome) -> Self {
        let request_id = outcome.request_id;
        let (duplicate, delivery) = match outcome.status {
            CreateStatus::Committed { tx_hash, height } => {
                (false, Some(Delivery::Committed { tx_hash, height }))
            }
            CreateStatus::Duplicate { delivery } => (true, delivery),
        };
        let mut response = Self {
            request_id,
            duplicate,
            status: DeliveryStatus::Pending,
            tx_hash: None,
            height: None,
            tx: None,
        };
        match delivery {
            Some(Delivery::Committed { tx_hash, height }) => {
                response.status = DeliveryStatus::Committed;
                response.tx_hash = Some(tx_hash);
                response.height = Some(height);
            }
            Some(Delivery::Pending { tx }) => response.tx = Some(tx),
            // Rejections surface as errors; an untracked delivery is still in flight.
            Some(Delivery::Rejected { .. }) | None => {}
        }
        response
    }
}

fn respond(outcome: CreateOutcome) -> (StatusCode, Json<CreateResponse>) {
    let response = CreateResponse::from(outcome);
    (response.http_status(), Json(response))
}

/// `POST /requests/:namespace/:identifier`
///
/// The pipeline runs in its own task: once a request is recorded its
/// broadcast completes even if the client goes away.
pub async fn create_request(
    State(state): State<AppState>,
    Path((namespace, identifier)): Path<(String, String)>,
    body: Result<Json<Request>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let task = tokio::spawn(async move {
        state
            .create_with_retry(&namespace, &identifier, request)
            .await
    });
    let outcome = task
        .await
        .map_err(|e| ApiError::Internal(format!("create task failed: {e}")))??;

    Ok(respond(outcome))
}

/// `POST /v1/requests/:request_id/broadcast`
///
/// Resends a transaction left pending by a transport failure. Settled
/// requests are answered without contacting the ledger.
pub async fn broadcast_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let id = parse_request_id(&request_id)?;
    let task = tokio::spawn(async move { state.resume_with_retry(id).await });
    let outcome = task
        .await
        .map_err(|e| ApiError::Internal(format!("broadcast task failed: {e}")))??;

    let mut response = CreateResponse::from(outcome);
    response.duplicate = false;
    Ok((response.http_status(), Json(response)))
}

fn parse_request_id(raw: &str) -> Result<RequestId, ApiError> {
    RequestId::from_hex(raw).map_err(|e| ApiError::BadRequest(format!("invalid request id: {e}")))
}

/// `GET /v1/requests/:request_id`
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<RetainedRequest>, ApiError> {
    let id = parse_request_id(&request_id)?;
    state
        .pipeline()
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("request {id} not found")))
}
