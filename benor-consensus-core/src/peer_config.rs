use thiserror::Error;

use crate::{PeerId, Value};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a cluster needs at least one peer")]
    EmptyCluster,
    #[error("faulty count {faulty} must be lower than node count {nodes}")]
    TooManyFaulty { nodes: usize, faulty: usize },
    #[error("peer id {peer} is out of range for {nodes} peers")]
    PeerOutOfRange { peer: PeerId, nodes: usize },
    #[error("initial value of peer {0} must be 0 or 1")]
    UndecidedInitialValue(PeerId),
}

/// Immutable per-peer configuration, fixed when the peer is created.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PeerConfig {
    peer_id: PeerId,
    node_count: usize,
    faulty_count: usize,
    initial_value: Value,
    is_faulty: bool,
}

impl PeerConfig {
    pub fn new(
        peer_id: PeerId,
        node_count: usize,
        faulty_count: usize,
        initial_value: Value,
        is_faulty: bool,
    ) -> Result<Self, ConfigError> {
        if node_count == 0 {
            return Err(ConfigError::EmptyCluster);
        }
        if faulty_count >= node_count {
            return Err(ConfigError::TooManyFaulty {
                nodes: node_count,
                faulty: faulty_count,
            });
        }
        if peer_id >= node_count {
            return Err(ConfigError::PeerOutOfRange {
                peer: peer_id,
                nodes: node_count,
            });
        }
        if !initial_value.is_bit() {
            return Err(ConfigError::UndecidedInitialValue(peer_id));
        }
        Ok(PeerConfig {
            peer_id,
            node_count,
            faulty_count,
            initial_value,
            is_faulty,
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }
    pub fn node_count(&self) -> usize {
        self.node_count
    }
    pub fn faulty_count(&self) -> usize {
        self.faulty_count
    }
    pub fn initial_value(&self) -> Value {
        self.initial_value
    }
    pub fn is_faulty(&self) -> bool {
        self.is_faulty
    }

    /// Whether `N > 3F`, the bound under which the protocol terminates.
    pub fn tolerates_faults(&self) -> bool {
        self.node_count > 3 * self.faulty_count
    }
}
