use benor_consensus_core::PeerConfig;

/// Quorum thresholds derived from the cluster size.
///
/// Two thresholds drive the protocol:
///
/// - `quorum` is `N - F`. At most `F` peers are silent, so a peer can always
///   expect to collect this many messages for a round, and must wait for them
///   before acting.
/// - `decision_threshold` is `F + 1`. At most `F` votes can come from faulty
///   peers, so `F + 1` identical votes include at least one honest vote.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConsensusParams {
    /// Total number of peers, `N`.
    node_count: usize,

    /// Maximum number of faulty peers tolerated, `F`.
    faulty_count: usize,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        ConsensusParams {
            node_count: 4,
            faulty_count: 1,
        }
    }
}

impl From<&PeerConfig> for ConsensusParams {
    fn from(config: &PeerConfig) -> Self {
        ConsensusParams::new(config.node_count(), config.faulty_count())
    }
}

impl ConsensusParams {
    pub fn new(node_count: usize, faulty_count: usize) -> Self {
        ConsensusParams {
            node_count,
            faulty_count,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
    pub fn faulty_count(&self) -> usize {
        self.faulty_count
    }

    /// Number of messages of one type needed for a round before acting, `N - F`.
    pub fn quorum(&self) -> usize {
        self.node_count.saturating_sub(self.faulty_count)
    }

    /// Number of identical votes needed to decide, `F + 1`.
    pub fn decision_threshold(&self) -> usize {
        self.faulty_count + 1
    }

    /// Whether `count` is a strict majority of all `N` peers.
    ///
    /// The comparison is against `N`, not against the number of proposals
    /// collected, so a quorum sample can fail to produce a majority.
    pub fn is_majority(&self, count: usize) -> bool {
        2 * count > self.node_count
    }
}

#[cfg(test)]
mod tests {
    use benor_consensus_core::Value;

    use super::*;

    #[test]
    fn test_defaults() {
        let expected = ConsensusParams {
            node_count: 4,
            faulty_count: 1,
        };

        let default: ConsensusParams = ConsensusParams::default();
        assert_eq!(expected, default);
        assert_eq!(default.quorum(), 3);
        assert_eq!(default.decision_threshold(), 2);
    }

    #[test]
    fn majority_is_strict_over_node_count() {
        let params = ConsensusParams::new(4, 1);
        assert!(!params.is_majority(2));
        assert!(params.is_majority(3));

        let params = ConsensusParams::new(5, 1);
        assert!(!params.is_majority(2));
        assert!(params.is_majority(3));
    }

    #[test]
    fn derived_from_peer_config() {
        let config = PeerConfig::new(2, 10, 3, Value::Zero, false).unwrap();
        let params = ConsensusParams::from(&config);
        assert_eq!(params.quorum(), 7);
        assert_eq!(params.decision_threshold(), 4);
    }
}
