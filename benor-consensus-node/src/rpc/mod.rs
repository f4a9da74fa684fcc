//! HTTP surface of a peer: the protocol inbox and the control endpoints.

mod handlers;
mod routes;

pub use routes::create_router;

use crate::readiness::ReadinessBarrier;
use crate::service::PeerHandle;

/// State shared by every handler of one peer.
#[derive(Clone, Debug)]
pub struct RpcState {
    /// The peer's consensus actor.
    pub peer: PeerHandle,
    /// Gate that `/start` waits on.
    pub readiness: ReadinessBarrier,
    /// Whether the peer was created faulty.
    pub faulty: bool,
}
