pub mod adaptor;
pub mod consensus;
pub mod consensus_params;
pub mod message_log;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adaptor::Adaptor;
pub use consensus::{Consensus, MessageStatus};
pub use consensus_params::ConsensusParams;
pub use message_log::{MessageLog, Tally};

/// Where a peer is in its consensus run.
///
/// A peer is created `Idle`. Starting it moves it to `Running` in round 1,
/// unless it is faulty, in which case it stays `Idle` forever. Each vote
/// quorum either decides or advances the round, so a peer cycles inside
/// `Running` until it reaches `Decided`. Stopping a peer from any phase is
/// final.
///
///
///   Idle ---start---> Running(k) ---vote quorum, no F+1---> Running(k+1)
///     \                   |
///      \                  | F+1 identical votes
///       \                 v
///        \------------> Decided
///         \               |
///          \--- stop ---> Killed <--- stop
///
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsensusPhase {
    /// Not started yet, or faulty.
    Idle,
    /// Working on a round without a decision.
    Running,
    /// A value has been decided and will not change.
    Decided,
    /// Stopped by the control surface; all input is ignored.
    Killed,
}
