//! Single-subscriber event streams for consumer notifications
//!
//! Each stream carries one category of notification in emission order.
//! Subscribing replaces any previous subscriber; emitting with no
//! subscriber drops the value. There is no buffering or replay across
//! subscriptions.

use lanscout_core::ServiceRecord;
use parking_lot::Mutex;

/// Receiving side of one stream subscription.
///
/// Dropping the subscription (or being replaced by a later `subscribe`)
/// closes the channel; `recv` then returns `None`.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: async_channel::Receiver<T>,
}

impl<T> Subscription<T> {
    /// Waits for the next value. Returns `None` once detached.
    pub async fn recv(&self) -> Option<T> {
        self.rx.recv().await.ok()
    }

    /// Returns the next value if one is already queued.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// One ordered, push-style notification stream with at most one
/// active subscriber.
pub struct EventStream<T> {
    slot: Mutex<Option<async_channel::Sender<T>>>,
}

impl<T> EventStream<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Attaches a subscriber, replacing any existing one.
    ///
    /// The previous subscription's channel closes; values emitted from
    /// this point on are delivered to the new subscriber only.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = async_channel::unbounded();
        *self.slot.lock() = Some(tx);
        Subscription { rx }
    }

    /// Detaches the current subscriber, if any.
    pub fn unsubscribe(&self) {
        self.slot.lock().take();
    }

    /// Whether a live subscriber is attached.
    pub fn has_subscriber(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Delivers `value` to the current subscriber, or drops it when
    /// there is none.
    pub fn emit(&self, value: T) {
        let mut slot = self.slot.lock();
        let disconnected = match slot.as_ref() {
            Some(tx) => tx.try_send(value).is_err(),
            None => false,
        };
        if disconnected {
            // Receiver was dropped without an explicit unsubscribe.
            *slot = None;
        }
    }
}

impl<T> Default for EventStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The four notification streams exposed to consumers.
#[derive(Default)]
pub struct DiscoveryEvents {
    /// Discovery running-state changes
    pub running: EventStream<bool>,

    /// A service instance appeared (pre-resolution, host/port unset)
    pub discovered: EventStream<ServiceRecord>,

    /// A service finished resolving (host/port/attributes populated)
    pub resolved: EventStream<ServiceRecord>,

    /// A service instance disappeared
    pub lost: EventStream<ServiceRecord>,
}

impl DiscoveryEvents {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emissions_preserve_order() {
        let stream = EventStream::new();
        let sub = stream.subscribe();

        stream.emit(1u32);
        stream.emit(2);
        stream.emit(3);

        assert_eq!(sub.recv().await, Some(1));
        assert_eq!(sub.recv().await, Some(2));
        assert_eq!(sub.recv().await, Some(3));
    }

    #[tokio::test]
    async fn test_emit_without_subscriber_is_dropped() {
        let stream = EventStream::new();
        stream.emit(41u32);

        // A later subscriber must not see earlier emissions.
        let sub = stream.subscribe();
        stream.emit(42);

        assert_eq!(sub.recv().await, Some(42));
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_previous() {
        let stream = EventStream::new();
        let first = stream.subscribe();
        let second = stream.subscribe();

        stream.emit(7u32);

        assert_eq!(second.recv().await, Some(7));
        // The first subscription's channel is closed.
        assert_eq!(first.recv().await, None);
    }

    #[tokio::test]
    async fn test_unsubscribe_detaches() {
        let stream = EventStream::new();
        let sub = stream.subscribe();
        stream.unsubscribe();

        stream.emit(9u32);
        assert_eq!(sub.recv().await, None);
        assert!(!stream.has_subscriber());
    }

    #[tokio::test]
    async fn test_dropped_receiver_clears_slot() {
        let stream = EventStream::new();
        let sub = stream.subscribe();
        drop(sub);

        stream.emit(1u32);
        assert!(!stream.has_subscriber());
    }
}
