use benor_consensus_core::{ConfigError, PeerId, Round};
use thiserror::Error;

/// Errors from running or driving consensus nodes.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("faulty peer {0} is not part of the cluster")]
    UnknownPeer(PeerId),

    #[error("peer {peer} has no port: base port {base_port} + {peer} exceeds 65535")]
    PortRange { base_port: u16, peer: PeerId },

    #[error("failed to bind peer {peer} on port {port}: {source}")]
    Bind {
        peer: PeerId,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file: {0}")]
    ConfigFile(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("consensus actor of peer {0} has shut down")]
    PeerStopped(PeerId),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("peer {peer} reached round {round} without deciding")]
    RoundLimit { peer: PeerId, round: Round },
}
