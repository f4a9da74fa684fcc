//! HTTP runtime for Ben-Or consensus peers.
//!
//! Every peer is a [`service::PeerHandle`] actor wrapping a
//! [`benor_consensus::Consensus`] engine, served over HTTP by [`rpc`] and
//! talking to the other peers through a [`transport::Transport`].

pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod readiness;
pub mod rpc;
pub mod service;
pub mod telemetry;
pub mod transport;

pub use client::NodeClient;
pub use cluster::{launch_cluster, ClusterHandle};
pub use config::ClusterConfig;
pub use error::NodeError;
pub use readiness::ReadinessBarrier;
pub use service::PeerHandle;
pub use telemetry::init_tracing;
