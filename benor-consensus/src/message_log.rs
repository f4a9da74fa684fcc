use std::collections::HashMap;

use benor_consensus_core::{Round, Value};

use crate::consensus_params::ConsensusParams;

/// Every proposal and vote a peer has received, grouped by round.
///
/// Lists are append-only. A round that has seen no message reads as empty.
#[derive(Debug, Default)]
pub struct MessageLog {
    proposals: HashMap<Round, Vec<Value>>,
    votes: HashMap<Round, Vec<Value>>,
}

impl MessageLog {
    pub fn new() -> Self {
        MessageLog::default()
    }

    /// Append a proposal and return everything collected for its round.
    pub fn record_proposal(&mut self, round: Round, value: Value) -> &[Value] {
        let entry = self.proposals.entry(round).or_default();
        entry.push(value);
        entry
    }

    /// Append a vote and return everything collected for its round.
    pub fn record_vote(&mut self, round: Round, value: Value) -> &[Value] {
        let entry = self.votes.entry(round).or_default();
        entry.push(value);
        entry
    }

    pub fn proposals(&self, round: Round) -> &[Value] {
        self.proposals.get(&round).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn votes(&self, round: Round) -> &[Value] {
        self.votes.get(&round).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Counts of each symbol among the messages collected for a round.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    pub zeros: usize,
    pub ones: usize,
    pub undecided: usize,
}

impl Tally {
    pub fn of(values: &[Value]) -> Self {
        values.iter().fold(Tally::default(), |mut tally, value| {
            match value {
                Value::Zero => tally.zeros += 1,
                Value::One => tally.ones += 1,
                Value::Undecided => tally.undecided += 1,
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.zeros + self.ones + self.undecided
    }

    /// The value to vote for after a proposal quorum: a bit held by a strict
    /// majority of all peers, otherwise [`Value::Undecided`].
    pub fn majority(&self, params: &ConsensusParams) -> Value {
        if params.is_majority(self.zeros) {
            Value::Zero
        } else if params.is_majority(self.ones) {
            Value::One
        } else {
            Value::Undecided
        }
    }

    /// The value decided by a vote quorum, if some bit has at least `F + 1`
    /// votes. Zero is checked first.
    pub fn decision(&self, params: &ConsensusParams) -> Option<Value> {
        if self.zeros >= params.decision_threshold() {
            Some(Value::Zero)
        } else if self.ones >= params.decision_threshold() {
            Some(Value::One)
        } else {
            None
        }
    }

    /// The bit with strictly more votes, or `None` on a tie (including when
    /// every vote was undecided).
    pub fn leaning(&self) -> Option<Value> {
        match self.zeros.cmp(&self.ones) {
            std::cmp::Ordering::Greater => Some(Value::Zero),
            std::cmp::Ordering::Less => Some(Value::One),
            std::cmp::Ordering::Equal => None,
        }
    }
}
