use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

pub const HEALTH: &str = "/v1/health";
pub const INFO: &str = "/v1/info";
pub const CREATE_REQUEST: &str = "/requests/:namespace/:identifier";
pub const GET_REQUEST: &str = "/v1/requests/:request_id";
pub const BROADCAST_REQUEST: &str = "/v1/requests/:request_id/broadcast";

/// Build the axum router with all node endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::root_handler))
        .route(HEALTH, get(handler::health_handler))
        .route(INFO, get(handler::info_handler))
        .route(CREATE_REQUEST, post(handler::create_request))
        .route(GET_REQUEST, get(handler::get_request))
        .route(BROADCAST_REQUEST, post(handler::broadcast_request))
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
