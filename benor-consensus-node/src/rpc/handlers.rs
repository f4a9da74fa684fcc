//! HTTP request handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error, warn};

use benor_consensus_core::Message;

use super::RpcState;

/// Handler for `GET /status` - liveness probe.
pub async fn status_handler(State(state): State<RpcState>) -> impl IntoResponse {
    if state.faulty {
        (StatusCode::INTERNAL_SERVER_ERROR, "faulty")
    } else {
        (StatusCode::OK, "live")
    }
}

/// Handler for `POST /message` - protocol inbox.
///
/// Always acknowledged with 200. Bodies that are not a valid message are
/// logged and dropped.
pub async fn message_handler(State(state): State<RpcState>, body: Bytes) -> impl IntoResponse {
    match serde_json::from_slice::<Message>(&body) {
        Ok(message) => {
            if let Err(err) = state.peer.deliver(message).await {
                error!(peer = state.peer.peer_id(), %err, "dropping message");
            }
        }
        Err(err) => {
            warn!(peer = state.peer.peer_id(), %err, "ignoring malformed message");
        }
    }
    (StatusCode::OK, "Message received and processed.")
}

/// Handler for `GET /start` - wait for every peer, then begin the run.
pub async fn start_handler(State(state): State<RpcState>) -> Response {
    if !state.readiness.is_ready() {
        debug!(peer = state.peer.peer_id(), "waiting for every peer to listen");
        state.readiness.wait().await;
    }
    match state.peer.start().await {
        Ok(_) => (StatusCode::OK, "Consensus algorithm started.").into_response(),
        Err(err) => internal_error(err),
    }
}

/// Handler for `GET /stop` - kill the peer.
pub async fn stop_handler(State(state): State<RpcState>) -> Response {
    match state.peer.stop().await {
        Ok(()) => (StatusCode::OK, "killed").into_response(),
        Err(err) => internal_error(err),
    }
}

/// Handler for `GET /getState` - round state snapshot.
pub async fn get_state_handler(State(state): State<RpcState>) -> Response {
    match state.peer.state().await {
        Ok(node_state) => Json(node_state).into_response(),
        Err(err) => internal_error(err),
    }
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error!(%err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}
