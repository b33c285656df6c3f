use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use rp_pipeline::PipelineError;
use rp_types::RequestId;
use serde::Serialize;
use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] rp_ledger::LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Error returned by a handler, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<RequestId>,
    /// Encoded transaction left pending by a transport failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    tx: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Pipeline(err) => match err {
                PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
                PipelineError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Transport { .. } => StatusCode::BAD_GATEWAY,
                PipelineError::UnknownRequest(_) => StatusCode::NOT_FOUND,
                PipelineError::Encoding(_) | PipelineError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (request_id, tx) = match &self {
            Self::Pipeline(err) => {
                let tx = match err {
                    PipelineError::Transport { tx, .. } => Some(tx.as_str().to_string()),
                    _ => None,
                };
                (err.request_id(), tx)
            }
            _ => (None, None),
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request refused");
        }
        let body = ErrorBody {
            error: self.to_string(),
            request_id,
            tx,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use rp_gate::ValidationError;
    use rp_ledger::EncodedTransaction;
    use rp_store::StoreError;
    use rp_types::Digest;

    use super::*;

    fn rid() -> RequestId {
        RequestId::from_digest(Digest::from_hash([3; 32]))
    }

    #[test]
    fn pipeline_errors_map_to_statuses() {
        let cases = [
            (
                PipelineError::Validation(ValidationError::param("namespace", "empty")),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::Rejected {
                    request_id: rid(),
                    code: 7,
                    reason: "duplicate".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PipelineError::Transport {
                    request_id: rid(),
                    cause: "refused".into(),
                    tx: EncodedTransaction::from_encoded("eA=="),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                PipelineError::Encoding("bad".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PipelineError::Store(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (PipelineError::UnknownRequest(rid()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn plain_errors_map_to_statuses() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }
}
