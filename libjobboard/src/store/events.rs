//! Change notifications for store subscribers
//!
//! The event bus uses `tokio::sync::broadcast` so any number of views can
//! follow the store. Emitting never blocks: with no subscribers the event is
//! dropped, and a lagging subscriber loses its oldest events instead of
//! stalling writers.
//!
//! # Example
//!
//! ```
//! use libjobboard::store::events::{EventBus, StoreEvent};
//!
//! # async fn example() {
//! let bus: EventBus<StoreEvent<&'static str>> = EventBus::new(16);
//! let mut receiver = bus.subscribe();
//!
//! bus.emit(StoreEvent { fields: vec!["job_offers"] });
//!
//! if let Ok(event) = receiver.recv().await {
//!     assert_eq!(event.fields, vec!["job_offers"]);
//! }
//! # }
//! ```

use tokio::sync::broadcast;

/// Event receiver type alias
pub type EventReceiver<E> = broadcast::Receiver<E>;

/// Broadcast bus for store notifications
#[derive(Clone)]
pub struct EventBus<E: Clone> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
    /// Create a new event bus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every event emitted after this call
    pub fn subscribe(&self) -> EventReceiver<E> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers without blocking
    pub fn emit(&self, event: E) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A write landed in the store and replaced the listed fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent<F> {
    pub fields: Vec<F>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_subscribers_does_not_block() {
        let bus: EventBus<StoreEvent<u8>> = EventBus::new(4);
        bus.emit(StoreEvent { fields: vec![1] });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let bus: EventBus<StoreEvent<u8>> = EventBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(StoreEvent { fields: vec![1, 2] });

        assert_eq!(first.recv().await.unwrap().fields, vec![1, 2]);
        assert_eq!(second.recv().await.unwrap().fields, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_oldest_events() {
        let bus: EventBus<StoreEvent<u8>> = EventBus::new(2);
        let mut receiver = bus.subscribe();

        for field in 0..4 {
            bus.emit(StoreEvent { fields: vec![field] });
        }

        match receiver.recv().await {
            Err(broadcast::error::RecvError::Lagged(skipped)) => assert_eq!(skipped, 2),
            other => panic!("Expected lag, got {:?}", other),
        }
        assert_eq!(receiver.recv().await.unwrap().fields, vec![2]);
    }
}
