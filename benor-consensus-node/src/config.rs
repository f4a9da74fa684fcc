use std::path::Path;

use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use benor_consensus_core::{ConfigError, PeerConfig, PeerId, Value};

use crate::error::NodeError;

/// Configuration of a local cluster of peers.
///
/// Peer `i` listens on `host:base_port + i`. Can be given on the command line
/// or as a JSON file; missing JSON fields take the defaults below.
#[derive(Args, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Total number of peers (N).
    #[arg(long = "nodes", default_value_t = 4)]
    pub node_count: usize,

    /// Maximum number of faulty peers the protocol tolerates (F).
    #[arg(long = "faulty", default_value_t = 1)]
    pub faulty_count: usize,

    /// Port of peer 0; peer i uses base_port + i.
    #[arg(long, default_value_t = 3000)]
    pub base_port: u16,

    /// Host every peer binds to and is reached at.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Comma separated initial values (0 or 1), one per peer. Peers without an
    /// entry get a random bit.
    #[arg(long, value_delimiter = ',')]
    pub initial_values: Vec<Value>,

    /// Comma separated ids of peers that run in faulty (silent) mode.
    #[arg(long, value_delimiter = ',')]
    pub faulty_peers: Vec<PeerId>,

    /// Seed for initial values and coin flips. Random when absent.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Capacity of each peer's inbound command queue.
    #[arg(long, default_value_t = 1024)]
    pub queue_capacity: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            node_count: 4,
            faulty_count: 1,
            base_port: 3000,
            host: "127.0.0.1".to_string(),
            initial_values: Vec::new(),
            faulty_peers: Vec::new(),
            seed: None,
            queue_capacity: 1024,
        }
    }
}

impl ClusterConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Port of `peer`, `base_port + peer`, if it fits in a port number.
    pub fn port(&self, peer: PeerId) -> Result<u16, NodeError> {
        u16::try_from(peer)
            .ok()
            .and_then(|offset| self.base_port.checked_add(offset))
            .ok_or(NodeError::PortRange {
                base_port: self.base_port,
                peer,
            })
    }

    pub fn peer_url(&self, peer: PeerId) -> Result<String, NodeError> {
        Ok(format!("http://{}:{}", self.host, self.port(peer)?))
    }

    pub fn is_faulty(&self, peer: PeerId) -> bool {
        self.faulty_peers.contains(&peer)
    }

    /// Validated configuration of every peer, in peer order.
    pub fn peer_configs(&self) -> Result<Vec<PeerConfig>, NodeError> {
        let Some(last) = self.node_count.checked_sub(1) else {
            return Err(ConfigError::EmptyCluster.into());
        };
        self.port(last)?;
        if let Some(peer) = self.faulty_peers.iter().find(|p| **p >= self.node_count) {
            return Err(NodeError::UnknownPeer(*peer));
        }
        let mut rng = self.rng(0);
        (0..self.node_count)
            .map(|peer| {
                let initial = match self.initial_values.get(peer) {
                    Some(value) => *value,
                    None => rng.gen(),
                };
                PeerConfig::new(
                    peer,
                    self.node_count,
                    self.faulty_count,
                    initial,
                    self.is_faulty(peer),
                )
                .map_err(NodeError::from)
            })
            .collect()
    }

    /// Random source for `stream`. Seeded runs give every stream its own
    /// deterministic sequence.
    pub fn rng(&self, stream: u64) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream)),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
