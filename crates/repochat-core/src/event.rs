//! Broadcast event bus for distributing [`IngestEvent`] to subscribers.
//!
//! Built on `tokio::sync::broadcast`. The rendering layer subscribes to
//! observe ingestion state transitions; publishing with no active
//! subscribers is a no-op.

use repochat_types::event::IngestEvent;
use tokio::sync::broadcast;

/// Multi-consumer event bus for ingestion lifecycle events.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct EventBus {
    sender: broadcast::Sender<IngestEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: IngestEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repochat_types::repo::RepoRef;

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(IngestEvent::Started {
            repo: RepoRef::new("foo"),
        });

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, IngestEvent::Started { .. }));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(IngestEvent::Completed {
            repo: RepoRef::new("foo"),
        });

        assert!(matches!(
            rx1.recv().await.unwrap(),
            IngestEvent::Completed { .. }
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            IngestEvent::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.publish(IngestEvent::Started {
            repo: RepoRef::new("foo"),
        });
        bus.publish(IngestEvent::Failed {
            repo: RepoRef::new("foo"),
            reason: "clone failed".to_string(),
        });
    }
}
