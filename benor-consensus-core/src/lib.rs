pub mod message;
pub mod peer_config;
pub mod value;

pub use message::{Message, MessageType, NodeState};
pub use peer_config::{ConfigError, PeerConfig};
pub use value::{InvalidValue, Value};

/// Index of one propose/vote cycle. The first round of a run is 1.
pub type Round = u64;

/// Index of a peer in the cluster, `0..N`.
pub type PeerId = usize;
