//! Change broadcaster: fan-out of applied slice writes to every connected
//! subscriber.
//!
//! Delivery is fire-and-forget over a bounded `tokio::sync::broadcast`
//! channel: at most once per currently-connected subscriber, per-slice
//! ordering follows apply order, and a slow or disconnected subscriber
//! never blocks the rest. Late joiners receive the full snapshot on
//! connect instead of history.

use serde_json::Value;
use tokio::sync::broadcast;

use crate::models::SliceName;

/// Channel depth before slow receivers start lagging. A lagged receiver
/// skips the missed events and keeps going; it stays correct because every
/// event carries the full canonical slice value.
const CHANNEL_CAPACITY: usize = 256;

/// One applied mutation: the slice that changed and its new canonical value.
#[derive(Debug, Clone)]
pub struct StateEvent {
    pub slice: SliceName,
    pub value: Value,
}

#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<StateEvent>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a change. A send error only means no subscriber is currently
    /// connected, which is not a failure.
    pub fn publish(&self, slice: SliceName, value: Value) {
        let receivers = self.sender.receiver_count();
        if self.sender.send(StateEvent { slice, value }).is_ok() {
            tracing::debug!(slice = %slice, receivers, "broadcast applied change");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
