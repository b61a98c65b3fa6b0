//! Player notification registry.
//!
//! Hosts publish playback lifecycle events here; the bridge subscribes by
//! event kind. Listeners for one event fire in subscription order and every
//! subscription can be removed again at teardown.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Player lifecycle events the bridge reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    PlaybackStateChanged,
    NowPlayingItemChanged,
    PlaybackTimeChanged,
    VolumeChanged,
    Unload,
}

impl PlayerEvent {
    pub const ALL: [PlayerEvent; 5] = [
        PlayerEvent::PlaybackStateChanged,
        PlayerEvent::NowPlayingItemChanged,
        PlayerEvent::PlaybackTimeChanged,
        PlayerEvent::VolumeChanged,
        PlayerEvent::Unload,
    ];
}

/// Handle returned by [`NotificationHub::subscribe`], usable for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct NotificationHub {
    listeners: Mutex<HashMap<PlayerEvent, Vec<(SubscriptionId, Listener)>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(PlayerEvent, usize)> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(event, listeners)| (*event, listeners.len()))
            .collect();
        f.debug_struct("NotificationHub")
            .field("listeners", &counts)
            .finish()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, event: PlayerEvent, listener: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap()
            .entry(event)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Removes one subscription. Unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut listeners = self.listeners.lock().unwrap();
        for entries in listeners.values_mut() {
            entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }

    /// Fires all listeners registered for `event`, in subscription order.
    pub fn notify(&self, event: PlayerEvent) {
        let listeners = self.listeners.lock().unwrap();
        if let Some(entries) = listeners.get(&event) {
            for (_, listener) in entries {
                listener();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn notify_fires_listeners_in_order() {
        let hub = NotificationHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            hub.subscribe(PlayerEvent::VolumeChanged, move || {
                seen.lock().unwrap().push(tag);
            });
        }

        hub.notify(PlayerEvent::VolumeChanged);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_removes_listener() {
        let hub = NotificationHub::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let id = hub.subscribe(PlayerEvent::Unload, move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(PlayerEvent::Unload);
        hub.unsubscribe(id);
        hub.notify(PlayerEvent::Unload);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn events_are_isolated_from_each_other() {
        let hub = NotificationHub::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        hub.subscribe(PlayerEvent::PlaybackStateChanged, move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(PlayerEvent::NowPlayingItemChanged);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
