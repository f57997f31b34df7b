//! Event publishing port and the in-process implementation.

use tokio::sync::broadcast;
use tracing::debug;

use aidhub_entity::event::EventEnvelope;

/// Outbound side of the push channel.
///
/// Services publish one envelope per successful mutation; the transport
/// fans it out to every connected session.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all connected sessions.
    fn publish(&self, envelope: EventEnvelope);
}

/// Broadcast-channel publisher for single-process deployments and tests.
#[derive(Debug)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<EventEnvelope>,
}

impl BroadcastPublisher {
    /// Create a publisher with the given buffer size.
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to the published event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, envelope: EventEnvelope) {
        debug!(event = envelope.event.name(), "publishing event");
        // No subscribers is not an error.
        let _ = self.tx.send(envelope);
    }
}
