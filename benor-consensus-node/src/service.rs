//! Single-writer actor around one peer's consensus engine.
//!
//! The engine is owned by one tokio task and only ever touched from it. HTTP
//! handlers talk to the task through a bounded queue, so inbound messages for
//! a peer are applied strictly one after another and a state read is ordered
//! after every command queued before it.

use rand::RngCore;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use benor_consensus::{Adaptor, Consensus, MessageStatus};
use benor_consensus_core::{Message, NodeState, PeerId};

use crate::error::NodeError;

#[derive(Debug)]
enum Command {
    Deliver(Message),
    Start(oneshot::Sender<bool>),
    Stop(oneshot::Sender<()>),
    State(oneshot::Sender<NodeState>),
}

/// Cloneable sending side of a peer actor.
#[derive(Clone, Debug)]
pub struct PeerHandle {
    peer_id: PeerId,
    commands: mpsc::Sender<Command>,
}

/// Receiving side of a peer actor, turned into a running task by
/// [`PeerInbox::spawn`].
#[derive(Debug)]
pub struct PeerInbox {
    peer_id: PeerId,
    commands: mpsc::Receiver<Command>,
}

impl PeerHandle {
    /// Create the queue of a peer actor. The handle can be shared before the
    /// engine exists, which lets transports be wired up first.
    pub fn new(peer_id: PeerId, capacity: usize) -> (PeerHandle, PeerInbox) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            PeerHandle {
                peer_id,
                commands: sender,
            },
            PeerInbox {
                peer_id,
                commands: receiver,
            },
        )
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Queue an inbound protocol message.
    pub async fn deliver(&self, message: Message) -> Result<(), NodeError> {
        self.send(Command::Deliver(message)).await
    }

    /// Start the run. Resolves to whether the first proposal was broadcast.
    pub async fn start(&self) -> Result<bool, NodeError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Start(reply)).await?;
        response.await.map_err(|_| NodeError::PeerStopped(self.peer_id))
    }

    pub async fn stop(&self) -> Result<(), NodeError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Stop(reply)).await?;
        response.await.map_err(|_| NodeError::PeerStopped(self.peer_id))
    }

    pub async fn state(&self) -> Result<NodeState, NodeError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::State(reply)).await?;
        response.await.map_err(|_| NodeError::PeerStopped(self.peer_id))
    }

    async fn send(&self, command: Command) -> Result<(), NodeError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| NodeError::PeerStopped(self.peer_id))
    }
}

impl PeerInbox {
    /// Run `engine` on its own task until every handle is dropped.
    pub fn spawn<A, R>(self, engine: Consensus<A, R>) -> JoinHandle<()>
    where
        A: Adaptor + Send + 'static,
        R: RngCore + Send + 'static,
    {
        tokio::spawn(self.run(engine))
    }

    async fn run<A: Adaptor, R: RngCore>(mut self, mut engine: Consensus<A, R>) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Deliver(message) => {
                    let status = engine.handle(message);
                    if status != MessageStatus::Pending {
                        trace!(peer = self.peer_id, ?message, ?status, "message handled");
                    }
                }
                Command::Start(reply) => {
                    let _ = reply.send(engine.start());
                }
                Command::Stop(reply) => {
                    engine.stop();
                    let _ = reply.send(());
                }
                Command::State(reply) => {
                    let _ = reply.send(engine.state());
                }
            }
        }
        debug!(peer = self.peer_id, "peer actor finished");
    }
}
