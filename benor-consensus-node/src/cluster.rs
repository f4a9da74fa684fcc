//! Launching and driving a local cluster of peers.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info};

use benor_consensus::Consensus;
use benor_consensus_core::{NodeState, PeerConfig, PeerId, Round};

use crate::client::NodeClient;
use crate::config::ClusterConfig;
use crate::error::NodeError;
use crate::readiness::ReadinessBarrier;
use crate::rpc::{create_router, RpcState};
use crate::service::PeerHandle;
use crate::transport::{Broadcaster, HttpTransport};

/// One running peer: its actor and its HTTP server.
struct NodeRuntime {
    config: PeerConfig,
    actor: JoinHandle<()>,
    server: JoinHandle<()>,
}

/// Every peer of a cluster running in this process.
pub struct ClusterHandle {
    nodes: Vec<NodeRuntime>,
    clients: Vec<NodeClient>,
}

/// Bind and serve every peer of `config` on `base_port + i`.
///
/// Peers share one readiness barrier; each marks itself ready as soon as its
/// listener is bound, so `/start` calls block until the last one is up.
pub async fn launch_cluster(config: &ClusterConfig) -> Result<ClusterHandle, NodeError> {
    let peer_configs = config.peer_configs()?;
    let node_count = config.node_count;
    let http = reqwest::Client::new();
    let clients = (0..node_count)
        .map(|peer| Ok(NodeClient::new(http.clone(), config.peer_url(peer)?)))
        .collect::<Result<Vec<_>, NodeError>>()?;
    let transport = Arc::new(HttpTransport::new(clients.clone()));
    let readiness = ReadinessBarrier::new(node_count);

    let mut nodes = Vec::with_capacity(node_count);
    for peer_config in peer_configs {
        let peer = peer_config.peer_id();
        let port = config.port(peer)?;
        let listener = TcpListener::bind((config.host.as_str(), port))
            .await
            .map_err(|source| NodeError::Bind { peer, port, source })?;

        let engine = Consensus::new(
            peer_config,
            Broadcaster::new(peer, node_count, transport.clone()),
            config.rng(peer as u64 + 1),
        );
        let (handle, inbox) = PeerHandle::new(peer, config.queue_capacity);
        let actor = inbox.spawn(engine);

        let app = create_router(RpcState {
            peer: handle,
            readiness: readiness.clone(),
            faulty: peer_config.is_faulty(),
        });
        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!(peer, %err, "node server failed");
            }
        });

        info!(peer, port, faulty = peer_config.is_faulty(), "node listening");
        readiness.mark_ready(peer);
        nodes.push(NodeRuntime {
            config: peer_config,
            actor,
            server,
        });
    }

    Ok(ClusterHandle { nodes, clients })
}

impl ClusterHandle {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn client(&self, peer: PeerId) -> Option<&NodeClient> {
        self.clients.get(peer)
    }

    /// Call `/start` on every peer concurrently.
    pub async fn start_all(&self) -> Result<(), NodeError> {
        let mut starts = JoinSet::new();
        for client in self.clients.iter().cloned() {
            starts.spawn(async move { client.start().await });
        }
        while let Some(result) = starts.join_next().await {
            result??;
        }
        Ok(())
    }

    pub async fn stop_all(&self) -> Result<(), NodeError> {
        for client in &self.clients {
            client.stop().await?;
        }
        Ok(())
    }

    pub async fn states(&self) -> Result<Vec<NodeState>, NodeError> {
        let mut states = Vec::with_capacity(self.clients.len());
        for client in &self.clients {
            states.push(client.get_state().await?);
        }
        Ok(states)
    }

    /// Poll `/getState` until every live peer has decided.
    ///
    /// Faulty and killed peers are not waited for. Fails once a peer moves
    /// past `max_round` without deciding, which is how a run that exceeds the
    /// fault tolerance shows up.
    pub async fn wait_for_consensus(
        &self,
        poll_interval: Duration,
        max_round: Round,
    ) -> Result<Vec<NodeState>, NodeError> {
        loop {
            let states = self.states().await?;
            let mut settled = true;
            for (node, state) in self.nodes.iter().zip(&states) {
                if node.config.is_faulty() || state.killed || state.decided == Some(true) {
                    continue;
                }
                settled = false;
                if let Some(round) = state.k.filter(|round| *round > max_round) {
                    return Err(NodeError::RoundLimit {
                        peer: node.config.peer_id(),
                        round,
                    });
                }
            }
            if settled {
                return Ok(states);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Abort every server and actor task.
    pub fn shutdown(self) {
        for node in self.nodes {
            node.server.abort();
            node.actor.abort();
        }
    }
}
