//! Catalog event bus for real-time subscriptions
//!
//! One broadcast channel per topic. Publishing is fire-and-forget: the
//! publisher never waits on subscribers, a lagging subscriber drops its own
//! oldest events without affecting anyone else, and events published while
//! nobody listens are lost (at-most-once, no replay). Each subscriber sees
//! events in publish order.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::db::{AuthorRecord, BookRecord};

/// Event broadcast when a book is added to the catalog.
/// Carries the book fully resolved with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAddedEvent {
    pub book: BookRecord,
    pub author: AuthorRecord,
}

/// Event bus configuration
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast channel capacity per topic
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Process-wide pub/sub state: created at startup, shared via `Arc`,
/// closed on shutdown.
pub struct EventBus {
    book_added_tx: broadcast::Sender<BookAddedEvent>,
    closed: AtomicBool,
}

impl EventBus {
    pub fn new(config: EventBusConfig) -> Self {
        let (book_added_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            book_added_tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Publish to the BOOK_ADDED topic. Never blocks; drops the event if the
    /// bus is closed or nobody is subscribed.
    pub fn publish_book_added(&self, event: BookAddedEvent) {
        if self.closed.load(Ordering::Acquire) {
            debug!(title = %event.book.title, "Event bus closed, dropping bookAdded event");
            return;
        }
        match self.book_added_tx.send(event) {
            Ok(receivers) => debug!(receivers, "Published bookAdded event"),
            Err(_) => debug!("No subscribers for bookAdded event"),
        }
    }

    /// Register a listener on the BOOK_ADDED topic. Dropping the receiver
    /// deregisters it.
    pub fn subscribe_book_added(&self) -> broadcast::Receiver<BookAddedEvent> {
        self.book_added_tx.subscribe()
    }

    /// Stop accepting publishes. Subscribers keep draining whatever is
    /// already buffered in their receivers.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    fn event(title: &str) -> BookAddedEvent {
        BookAddedEvent {
            book: BookRecord {
                id: "b1".to_string(),
                title: title.to_string(),
                published: 2008,
                genres: vec!["dev".to_string()],
                author_id: "a1".to_string(),
                created_at: String::new(),
            },
            author: AuthorRecord {
                id: "a1".to_string(),
                name: "Robert Martin".to_string(),
                born: None,
                book_count: 1,
                created_at: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish_book_added(event("Clean Code"));
        // A subscriber arriving afterwards never sees the earlier event
        let mut rx = bus.subscribe_book_added();
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_book_added();

        bus.publish_book_added(event("first"));
        bus.publish_book_added(event("second"));

        assert_eq!(rx.recv().await.unwrap().book.title, "first");
        assert_eq!(rx.recv().await.unwrap().book.title, "second");
    }

    #[tokio::test]
    async fn each_subscriber_gets_its_own_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe_book_added();
        let mut rx2 = bus.subscribe_book_added();

        bus.publish_book_added(event("shared"));

        assert_eq!(rx1.recv().await.unwrap().book.title, "shared");
        assert_eq!(rx2.recv().await.unwrap().book.title, "shared");
    }

    #[tokio::test]
    async fn closed_bus_refuses_new_publishes_but_drains_buffered() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_book_added();

        bus.publish_book_added(event("before close"));
        bus.close();
        bus.publish_book_added(event("after close"));

        assert_eq!(rx.recv().await.unwrap().book.title, "before close");
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
