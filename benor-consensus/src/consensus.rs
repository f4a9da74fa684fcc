use derivative::Derivative;
use rand::{Rng, RngCore};
use tracing::{debug, info, trace, warn};

use benor_consensus_core::{Message, MessageType, NodeState, PeerConfig, Round, Value};

use crate::adaptor::Adaptor;
use crate::consensus_params::ConsensusParams;
use crate::message_log::{MessageLog, Tally};
use crate::ConsensusPhase;

/// What handling one inbound message did to the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageStatus {
    /// The peer is faulty or killed and nothing was recorded, or the vote
    /// quorum would advance past the last representable round.
    Ignored,
    /// Recorded, but the round has not reached quorum yet.
    Pending,
    /// Recorded after the round's quorum was already acted upon.
    Recorded,
    /// This proposal completed the quorum; a vote was broadcast.
    Voted(Value),
    /// This vote gave a bit `F + 1` votes in a round at or past quorum and the
    /// peer decided.
    Decided(Value),
    /// This vote completed the quorum without a decision; the peer moved to
    /// `round` with `value` and broadcast a proposal for it.
    Advanced { round: Round, value: Value },
    /// This vote completed the quorum of a round the peer has already left,
    /// without a decision.
    Stale,
}

#[derive(Debug, Default)]
struct RoundState {
    killed: bool,
    round: Option<Round>,
    value: Option<Value>,
    decided: Option<bool>,
}

/// One peer's Ben-Or consensus state machine.
///
/// The engine owns its round state and message log exclusively and must be
/// driven by a single caller: every method takes `&mut self`, and
/// [`Consensus::handle`] must see inbound messages one at a time. Outbound
/// messages go through the [`Adaptor`]; coin flips for tied rounds come from
/// the injected random source, so a seeded source makes a run reproducible.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Consensus<A: Adaptor, R: RngCore> {
    config: PeerConfig,
    params: ConsensusParams,
    state: RoundState,
    log: MessageLog,
    #[derivative(Debug = "ignore")]
    adaptor: A,
    #[derivative(Debug = "ignore")]
    rng: R,
}

impl<A: Adaptor, R: RngCore> Consensus<A, R> {
    pub fn new(config: PeerConfig, adaptor: A, rng: R) -> Self {
        if !config.tolerates_faults() {
            warn!(
                peer = config.peer_id(),
                nodes = config.node_count(),
                faulty = config.faulty_count(),
                "cluster does not satisfy N > 3F, termination is not guaranteed"
            );
        }
        Consensus {
            params: ConsensusParams::from(&config),
            config,
            state: RoundState::default(),
            log: MessageLog::new(),
            adaptor,
            rng,
        }
    }

    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn adaptor(&self) -> &A {
        &self.adaptor
    }

    /// Snapshot of the round state, as served by `getState`.
    pub fn state(&self) -> NodeState {
        NodeState {
            killed: self.state.killed,
            x: self.state.value,
            decided: self.state.decided,
            k: self.state.round,
        }
    }

    pub fn phase(&self) -> ConsensusPhase {
        if self.state.killed {
            return ConsensusPhase::Killed;
        }
        match self.state.decided {
            None => ConsensusPhase::Idle,
            Some(false) => ConsensusPhase::Running,
            Some(true) => ConsensusPhase::Decided,
        }
    }

    /// Begin the run: enter round 1 with the initial value and propose it to
    /// every peer.
    ///
    /// Returns whether the initial proposal was broadcast. Faulty and killed
    /// peers keep their state untouched, and a peer that already holds a
    /// round (started before, or pulled forward by other peers' votes) is not
    /// reset.
    pub fn start(&mut self) -> bool {
        if self.state.killed {
            debug!(peer = self.config.peer_id(), "start ignored, peer is killed");
            return false;
        }
        if self.config.is_faulty() {
            debug!(peer = self.config.peer_id(), "start ignored, peer is faulty");
            return false;
        }
        if self.state.decided.is_some() {
            debug!(peer = self.config.peer_id(), "start ignored, peer already running");
            return false;
        }

        let value = self.config.initial_value();
        self.state.round = Some(1);
        self.state.value = Some(value);
        self.state.decided = Some(false);
        info!(peer = self.config.peer_id(), %value, "starting consensus");
        self.adaptor.broadcast(Message::propose(1, value));
        true
    }

    /// Kill the peer. Irreversible and idempotent.
    pub fn stop(&mut self) {
        if !self.state.killed {
            info!(peer = self.config.peer_id(), "peer killed");
        }
        self.state.killed = true;
    }

    /// Process one inbound protocol message.
    pub fn handle(&mut self, message: Message) -> MessageStatus {
        if self.config.is_faulty() || self.state.killed {
            trace!(peer = self.config.peer_id(), ?message, "dropping message");
            return MessageStatus::Ignored;
        }
        match message.message_type {
            MessageType::Propose => self.on_propose(message.round, message.value),
            MessageType::Vote => self.on_vote(message.round, message.value),
        }
    }

    fn on_propose(&mut self, round: Round, value: Value) -> MessageStatus {
        let quorum = self.params.quorum();
        let proposals = self.log.record_proposal(round, value);
        let collected = proposals.len();
        if collected < quorum {
            return MessageStatus::Pending;
        }
        if collected > quorum {
            return MessageStatus::Recorded;
        }

        let tally = Tally::of(proposals);
        let vote = tally.majority(&self.params);
        debug!(
            peer = self.config.peer_id(),
            round,
            proposals = tally.total(),
            zeros = tally.zeros,
            ones = tally.ones,
            %vote,
            "proposal quorum reached"
        );
        self.adaptor.broadcast(Message::vote(round, vote));
        MessageStatus::Voted(vote)
    }

    fn on_vote(&mut self, round: Round, value: Value) -> MessageStatus {
        let quorum = self.params.quorum();
        let votes = self.log.record_vote(round, value);
        let collected = votes.len();
        if collected < quorum {
            return MessageStatus::Pending;
        }
        let tally = Tally::of(votes);

        // A decided peer keeps voting in later rounds but never moves again.
        if self.state.decided == Some(true) {
            return MessageStatus::Recorded;
        }

        // The decision rule applies to every vote at or past quorum, in any round.
        if let Some(decided) = tally.decision(&self.params) {
            let current = self.state.round.map_or(round, |current| current.max(round));
            self.state.value = Some(decided);
            self.state.decided = Some(true);
            self.state.round = Some(current);
            info!(
                peer = self.config.peer_id(),
                round,
                votes = tally.total(),
                value = %decided,
                "decided"
            );
            return MessageStatus::Decided(decided);
        }

        // Rounds advance once, on the vote that fills the quorum.
        if collected > quorum {
            return MessageStatus::Recorded;
        }
        if self.state.round.map_or(false, |current| round < current) {
            debug!(peer = self.config.peer_id(), round, "vote quorum for a past round");
            return MessageStatus::Stale;
        }
        let Some(next_round) = round.checked_add(1) else {
            warn!(peer = self.config.peer_id(), round, "no round after this one, ignoring");
            return MessageStatus::Ignored;
        };

        let next_value = match tally.leaning() {
            Some(value) => value,
            None => self.rng.gen(),
        };
        self.state.round = Some(next_round);
        self.state.value = Some(next_value);
        self.state.decided = Some(false);
        debug!(
            peer = self.config.peer_id(),
            round = next_round,
            value = %next_value,
            zeros = tally.zeros,
            ones = tally.ones,
            "advancing round"
        );
        self.adaptor.broadcast(Message::propose(next_round, next_value));
        MessageStatus::Advanced {
            round: next_round,
            value: next_value,
        }
    }
}
