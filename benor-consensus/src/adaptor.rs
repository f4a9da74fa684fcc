use benor_consensus_core::Message;

/// The engine's view of the outside world.
///
/// The engine never talks to the network itself. Every message it emits is
/// handed to its adaptor, which must deliver it to all `N` peers, including
/// the sender. Delivery is best effort: no acknowledgment, no ordering and no
/// retry are expected.
pub trait Adaptor {
    /// Send `message` to every peer in the cluster.
    fn broadcast(&mut self, message: Message);
}

/// Collects broadcasts in memory instead of sending them.
impl Adaptor for Vec<Message> {
    fn broadcast(&mut self, message: Message) {
        self.push(message)
    }
}
