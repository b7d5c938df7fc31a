//! State sync bridge
//!
//! The only way viewers share anything. Local writes go out through
//! `SyncBridge::publish` as whole-field replacements; remote writes arrive on
//! a `Subscription` and overwrite the matching field of the local mirror.
//! There is no acknowledgement and no retry: a lost update is healed by the
//! next write to the same field.

pub mod memory;

use std::sync::mpsc::{Receiver, TryRecvError};

use crate::sim::{Attributes, FieldUpdate, SharedState};

pub use memory::{LinkConfig, MemoryStore};

/// Shared aggregate store provided by the host session
pub trait SharedStore {
    /// Current persisted state (fields never written are absent)
    fn snapshot(&self) -> Attributes;

    /// Replace one field; fire-and-forget, last write wins
    fn publish_field(&self, update: FieldUpdate);

    /// Receive every subsequent field change, including our own
    ///
    /// Updates to the same field arrive in the order the store applied them.
    fn subscribe(&self) -> Subscription;
}

/// Receiving end of a store subscription
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<FieldUpdate>,
}

impl Subscription {
    pub fn new(rx: Receiver<FieldUpdate>) -> Self {
        Self { rx }
    }

    /// Next delivered update, if one is waiting
    pub fn try_next(&self) -> Option<FieldUpdate> {
        match self.rx.try_recv() {
            Ok(update) => Some(update),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// One viewer's connection to the shared store
pub struct SyncBridge {
    store: Box<dyn SharedStore>,
    subscription: Option<Subscription>,
}

impl SyncBridge {
    /// Subscribe to `store`; call `snapshot` afterwards to hydrate
    pub fn connect(store: Box<dyn SharedStore>) -> Self {
        let subscription = Some(store.subscribe());
        Self {
            store,
            subscription,
        }
    }

    pub fn snapshot(&self) -> Attributes {
        self.store.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.subscription.is_some()
    }

    /// Send a local write to every viewer
    ///
    /// The caller has already applied it to its own mirror.
    pub fn publish(&self, update: FieldUpdate) {
        if !self.is_connected() {
            log::debug!("dropping {} publish after disconnect", update.field().as_str());
            return;
        }
        log::debug!("publish {}", update.field().as_str());
        self.store.publish_field(update);
    }

    pub fn publish_all(&self, updates: impl IntoIterator<Item = FieldUpdate>) {
        for update in updates {
            self.publish(update);
        }
    }

    /// Apply every pending remote update to `mirror`; returns how many
    pub fn drain(&mut self, mirror: &mut SharedState) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };
        let mut applied = 0;
        while let Some(update) = subscription.try_next() {
            mirror.apply(update);
            applied += 1;
        }
        applied
    }

    /// Stop receiving and sending; later publishes are dropped
    pub fn disconnect(&mut self) {
        if self.subscription.take().is_some() {
            log::debug!("sync bridge disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Paddle, PlayerSlot, Side};

    #[test]
    fn test_publish_reaches_other_viewer() {
        let store = MemoryStore::new();
        let a = SyncBridge::connect(Box::new(store.clone()));
        let mut b = SyncBridge::connect(Box::new(store.clone()));
        let mut mirror_b = SharedState::new(0.0);

        let paddle = Paddle::new(Side::Left, 3.0).with_velocity(-6.0, 4.0);
        a.publish(FieldUpdate::LeftPaddle(paddle));

        assert_eq!(b.drain(&mut mirror_b), 1);
        assert_eq!(mirror_b.left_paddle, paddle);
        assert_eq!(store.snapshot().left_paddle, Some(paddle));
    }

    #[test]
    fn test_own_publish_is_echoed() {
        let store = MemoryStore::new();
        let mut a = SyncBridge::connect(Box::new(store.clone()));
        let mut mirror = SharedState::new(0.0);

        a.publish(FieldUpdate::player(Side::Left, PlayerSlot::occupied_by(5, 1.0)));
        assert_eq!(a.drain(&mut mirror), 1);
        assert_eq!(mirror.left_player.member_id, 5);
    }

    #[test]
    fn test_disconnect_stops_traffic() {
        let store = MemoryStore::new();
        let mut a = SyncBridge::connect(Box::new(store.clone()));
        let mut mirror = SharedState::new(0.0);
        a.disconnect();

        a.publish(FieldUpdate::player(Side::Left, PlayerSlot::occupied_by(5, 1.0)));
        assert_eq!(a.drain(&mut mirror), 0);
        assert_eq!(store.snapshot().left_player, None);

        // The store notices the dropped subscription on its next fan-out
        let b = SyncBridge::connect(Box::new(store.clone()));
        b.publish(FieldUpdate::player(Side::Right, PlayerSlot::occupied_by(6, 1.0)));
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(a.drain(&mut mirror), 0);
        assert!(!mirror.right_player.is_occupied());
    }
}
