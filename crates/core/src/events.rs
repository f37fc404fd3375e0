//! Event fan-out to external observers

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::types::Match3Event;

/// Broadcasts [`Match3Event`]s to every registered subscriber.
///
/// Senders whose receiver has been dropped are pruned on the next emission.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<UnboundedSender<Match3Event>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<Match3Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: Match3Event) {
        trace!(event = event.as_str(), "emit");
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
