use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use benor_consensus_core::{NodeState, PeerConfig, PeerId, Value};

use crate::consensus::Consensus;
use crate::test_utils::{Envelope, Outbox};

pub(crate) type SimulatedPeer = Consensus<Outbox, ChaCha8Rng>;

/// A whole cluster of engines in one thread.
///
/// Messages in flight are delivered one at a time in an order drawn from a
/// seeded generator, so runs are unordered across peers yet reproducible.
/// Links can be cut to model lost messages.
pub(crate) struct SimulatedNetwork {
    peers: Vec<SimulatedPeer>,
    in_flight: Rc<RefCell<Vec<Envelope>>>,
    cut_links: HashSet<(PeerId, PeerId)>,
    rng: ChaCha8Rng,
    delivered: usize,
}

impl SimulatedNetwork {
    pub fn new(faulty_count: usize, initial_values: &[Value], faulty: &[PeerId], seed: u64) -> Self {
        let node_count = initial_values.len();
        let in_flight = Rc::new(RefCell::new(Vec::new()));
        let peers = initial_values
            .iter()
            .enumerate()
            .map(|(peer, initial)| {
                let config =
                    PeerConfig::new(peer, node_count, faulty_count, *initial, faulty.contains(&peer))
                        .unwrap();
                let outbox = Outbox::new(peer, node_count, in_flight.clone());
                let rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(peer as u64 + 1));
                Consensus::new(config, outbox, rng)
            })
            .collect();

        SimulatedNetwork {
            peers,
            in_flight,
            cut_links: HashSet::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            delivered: 0,
        }
    }

    /// Random initial bits for `node_count` peers.
    pub fn random_values(node_count: usize, seed: u64) -> Vec<Value> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..node_count).map(|_| rng.gen()).collect()
    }

    /// Drop every message sent from `from` to `to` from now on.
    pub fn cut_link(&mut self, from: PeerId, to: PeerId) {
        self.cut_links.insert((from, to));
    }

    pub fn start_all(&mut self) {
        for peer in self.peers.iter_mut() {
            peer.start();
        }
    }

    /// Deliver one message in flight. Returns `false` once nothing is left.
    pub fn step(&mut self) -> bool {
        let envelope = {
            let mut queue = self.in_flight.borrow_mut();
            if queue.is_empty() {
                return false;
            }
            let index = self.rng.gen_range(0..queue.len());
            queue.swap_remove(index)
        };
        if !self.cut_links.contains(&(envelope.from, envelope.to)) {
            self.peers[envelope.to].handle(envelope.message);
            self.delivered += 1;
        }
        true
    }

    /// Deliver until the network is quiet or `max_steps` messages were taken
    /// off the wire.
    pub fn run(&mut self, max_steps: usize) {
        for _ in 0..max_steps {
            if !self.step() {
                return;
            }
        }
    }

    pub fn peer(&self, peer: PeerId) -> &SimulatedPeer {
        &self.peers[peer]
    }

    pub fn states(&self) -> Vec<NodeState> {
        self.peers.iter().map(|peer| peer.state()).collect()
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.borrow().len()
    }

    /// Decisions of the peers that are not faulty.
    pub fn honest_decisions(&self) -> Vec<Option<Value>> {
        self.peers
            .iter()
            .filter(|peer| !peer.config().is_faulty())
            .map(|peer| peer.state().decision())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use benor_consensus_core::Value::{One, Undecided, Zero};

    use super::*;

    const MAX_STEPS: usize = 1_000_000;

    fn assert_agreement(network: &SimulatedNetwork) -> Value {
        let decisions = network.honest_decisions();
        let first = decisions[0].expect("peer did not decide");
        for decision in decisions {
            assert_eq!(decision, Some(first));
        }
        first
    }

    #[test]
    fn unanimous_cluster_decides_in_round_one() {
        let mut network = SimulatedNetwork::new(1, &[One, One, One, One], &[], 1);
        network.start_all();
        network.run(MAX_STEPS);

        assert_eq!(network.in_flight(), 0);
        for state in network.states() {
            assert_eq!(
                state,
                NodeState { killed: false, x: Some(One), decided: Some(true), k: Some(1) }
            );
        }
    }

    #[test]
    fn silent_faulty_peer_does_not_block_decision() {
        let mut network = SimulatedNetwork::new(1, &[Zero, Zero, Zero, Zero], &[3], 2);
        network.start_all();
        network.run(MAX_STEPS);

        let states = network.states();
        for state in &states[..3] {
            assert_eq!(state.decision(), Some(Zero));
        }
        assert_eq!(states[3], NodeState::default());
        assert!(network.peer(3).log().proposals(1).is_empty());
    }

    #[test]
    fn split_cluster_votes_undecided_then_randomizes() {
        let mut network = SimulatedNetwork::new(1, &[Zero, One, Zero, One], &[], 3);
        network.start_all();
        network.run(MAX_STEPS);

        for peer in 0..4 {
            let log = network.peer(peer).log();
            assert_eq!(log.proposals(1).len(), 4);
            assert!(log.votes(1).iter().all(|v| *v == Undecided));
            assert!(!log.proposals(2).is_empty());
            assert!(network.peer(peer).state().k.unwrap() >= 2);
        }
        assert_agreement(&network);
    }

    #[test]
    fn honest_peers_agree_across_seeds() {
        for seed in 0..200u64 {
            let values = SimulatedNetwork::random_values(7, seed);
            let faulty: Vec<PeerId> = (0..(seed as usize % 3)).map(|i| 6 - i).collect();
            let mut network = SimulatedNetwork::new(2, &values, &faulty, seed);
            network.start_all();
            network.run(MAX_STEPS);

            let decided = assert_agreement(&network);
            // Validity: a unanimous honest start can only decide that value.
            let honest: HashSet<Value> = values
                .iter()
                .enumerate()
                .filter(|(peer, _)| !faulty.contains(peer))
                .map(|(_, v)| *v)
                .collect();
            if honest.len() == 1 {
                assert!(honest.contains(&decided), "seed {seed}");
            }
        }
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed: u64| {
            let mut network = SimulatedNetwork::new(1, &[Zero, One, One, Zero], &[], seed);
            network.start_all();
            network.run(MAX_STEPS);
            (network.states(), network.delivered())
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn lost_messages_to_one_peer_are_tolerated() {
        let mut network = SimulatedNetwork::new(1, &[One, One, One, One], &[], 4);
        for from in 0..4 {
            network.cut_link(from, 2);
        }
        network.start_all();
        network.run(MAX_STEPS);

        let states = network.states();
        assert_eq!(states[2].decided, Some(false));
        assert_eq!(states[2].k, Some(1));
        for peer in [0, 1, 3] {
            assert_eq!(states[peer].decision(), Some(One));
        }
    }

    #[test]
    fn killed_peer_stays_frozen_while_others_run() {
        let mut network = SimulatedNetwork::new(1, &[One, One, One, One], &[], 5);
        network.start_all();
        network.peers[1].stop();
        network.run(MAX_STEPS);

        let states = network.states();
        assert_eq!(
            states[1],
            NodeState { killed: true, x: Some(One), decided: Some(false), k: Some(1) }
        );
        for peer in [0, 2, 3] {
            assert_eq!(states[peer].decision(), Some(One));
        }
    }
}
