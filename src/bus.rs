//! Process-wide catalog change stream.
//!
//! Every provider publishes here after a successful mutation. Delivery is
//! in-process only: a subscriber that does not exist when an event is sent
//! never sees it, and nothing is replayed.

use tokio::sync::broadcast;

use crate::domain::events::{CatalogChange, CatalogEvent};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Stamps and broadcasts a change. Returns how many subscribers received it.
    pub fn publish(&self, change: impl Into<CatalogChange>) -> usize {
        let event = CatalogEvent::now(change.into());
        let subject = event.change.subject();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(%subject, receivers, "catalog event published");
                receivers
            }
            Err(_) => {
                tracing::trace!(%subject, "catalog event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self { Self::new() }
}
