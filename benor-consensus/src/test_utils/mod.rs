use std::cell::RefCell;
use std::rc::Rc;

use benor_consensus_core::{Message, PeerId};

use crate::adaptor::Adaptor;

pub(crate) mod network;

/// A message in flight between two simulated peers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Envelope {
    pub from: PeerId,
    pub to: PeerId,
    pub message: Message,
}

/// Adaptor that fans a broadcast out into one envelope per peer on a queue
/// shared by the whole simulated cluster.
pub(crate) struct Outbox {
    from: PeerId,
    node_count: usize,
    queue: Rc<RefCell<Vec<Envelope>>>,
}

impl Outbox {
    pub fn new(from: PeerId, node_count: usize, queue: Rc<RefCell<Vec<Envelope>>>) -> Self {
        Outbox {
            from,
            node_count,
            queue,
        }
    }
}

impl Adaptor for Outbox {
    fn broadcast(&mut self, message: Message) {
        let mut queue = self.queue.borrow_mut();
        for to in 0..self.node_count {
            queue.push(Envelope {
                from: self.from,
                to,
                message,
            });
        }
    }
}
