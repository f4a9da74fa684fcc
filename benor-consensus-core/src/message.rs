use serde::{Deserialize, Serialize};

use crate::{Round, Value};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Propose,
    Vote,
}

/// A round-tagged protocol message exchanged between peers.
///
/// Serialized as `{"k": 1, "x": 0, "messageType": "propose"}`. The longer
/// names `round`, `value` and `type` are accepted when reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "k", alias = "round")]
    pub round: Round,
    #[serde(rename = "x", alias = "value")]
    pub value: Value,
    #[serde(rename = "messageType", alias = "type")]
    pub message_type: MessageType,
}

impl Message {
    pub fn propose(round: Round, value: Value) -> Self {
        Message {
            round,
            value,
            message_type: MessageType::Propose,
        }
    }

    pub fn vote(round: Round, value: Value) -> Self {
        Message {
            round,
            value,
            message_type: MessageType::Vote,
        }
    }
}

/// Snapshot of a peer's round state as reported by `getState`.
///
/// `x`, `decided` and `k` stay `None` until the peer starts, and forever on a
/// faulty peer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub killed: bool,
    pub x: Option<Value>,
    pub decided: Option<bool>,
    pub k: Option<Round>,
}

impl NodeState {
    /// The decided value, if the peer reached a decision.
    pub fn decision(&self) -> Option<Value> {
        match self.decided {
            Some(true) => self.x,
            _ => None,
        }
    }
}
