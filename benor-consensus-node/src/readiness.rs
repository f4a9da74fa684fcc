use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;

use benor_consensus_core::PeerId;

/// Cluster-wide "all peers are listening" gate.
///
/// Every node marks itself ready once its listener is bound; `start` waits on
/// the barrier before the first proposal goes out.
#[derive(Clone, Debug)]
pub struct ReadinessBarrier {
    node_count: usize,
    ready: Arc<watch::Sender<BTreeSet<PeerId>>>,
}

impl ReadinessBarrier {
    pub fn new(node_count: usize) -> Self {
        let (ready, _) = watch::channel(BTreeSet::new());
        ReadinessBarrier {
            node_count,
            ready: Arc::new(ready),
        }
    }

    pub fn mark_ready(&self, peer: PeerId) {
        self.ready.send_modify(|ready| {
            ready.insert(peer);
        });
    }

    pub fn is_ready(&self) -> bool {
        self.ready.borrow().len() >= self.node_count
    }

    /// Resolve once every peer has been marked ready.
    pub async fn wait(&self) {
        let mut receiver = self.ready.subscribe();
        let node_count = self.node_count;
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = receiver.wait_for(|ready| ready.len() >= node_count).await;
    }
}
