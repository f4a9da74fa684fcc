//! Route configuration for a peer.

use super::handlers::*;
use super::RpcState;
use axum::{
    routing::{get, post},
    Router,
};

/// Create the full router of one peer.
pub fn create_router(state: RpcState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/message", post(message_handler))
        .route("/start", get(start_handler))
        .route("/stop", get(stop_handler))
        .route("/getState", get(get_state_handler))
        .with_state(state)
}
