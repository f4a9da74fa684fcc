use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use benor_consensus::Adaptor;
use benor_consensus_core::{Message, PeerId};

use crate::client::NodeClient;
use crate::error::NodeError;

/// Point-to-point delivery of one message to one peer.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, to: PeerId, message: Message) -> Result<(), NodeError>;
}

/// Delivers messages with one `POST /message` per destination.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    peers: Vec<NodeClient>,
}

impl HttpTransport {
    pub fn new(peers: Vec<NodeClient>) -> Self {
        HttpTransport { peers }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, to: PeerId, message: Message) -> Result<(), NodeError> {
        match self.peers.get(to) {
            Some(peer) => peer.send_message(&message).await,
            None => Err(NodeError::UnknownPeer(to)),
        }
    }
}

/// Engine adaptor that fans every broadcast out to all peers, the sender
/// included, without waiting for any of the sends.
pub struct Broadcaster<T: Transport> {
    from: PeerId,
    node_count: usize,
    transport: Arc<T>,
}

impl<T: Transport> Broadcaster<T> {
    pub fn new(from: PeerId, node_count: usize, transport: Arc<T>) -> Self {
        Broadcaster {
            from,
            node_count,
            transport,
        }
    }
}

impl<T: Transport> Adaptor for Broadcaster<T> {
    /// Must be called from within a tokio runtime.
    fn broadcast(&mut self, message: Message) {
        for to in 0..self.node_count {
            let transport = self.transport.clone();
            let from = self.from;
            tokio::spawn(async move {
                if let Err(err) = transport.send(to, message).await {
                    debug!(from, to, ?message, %err, "message not delivered");
                }
            });
        }
    }
}
