//! Subscription manager for broadcasting client events.

use crate::types::Item;
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::types::{
    ClientEvent, DropReason, EventFilter, Observer, SubscriptionConfig, SubscriptionHandle,
    SubscriptionId,
};

enum Sink {
    Channel(Sender<ClientEvent>),
    Callback(Arc<dyn Observer>),
}

/// Internal subscription state.
struct Subscription {
    filter: EventFilter,
    sink: Sink,
}

impl Subscription {
    /// Try to send an event to a channel sink.
    fn try_send(sender: &Sender<ClientEvent>, event: ClientEvent) -> Result<(), DropReason> {
        match sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DropReason::BufferOverflow),
            Err(TrySendError::Disconnected(_)) => Err(DropReason::Disconnected),
        }
    }
}

/// Manages subscriptions and broadcasts events.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a channel subscription.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = self.next_id();
        let (sender, receiver) = bounded(config.buffer_size.max(1));

        self.subscriptions.write().insert(
            id,
            Subscription {
                filter: config.filter,
                sink: Sink::Channel(sender),
            },
        );

        SubscriptionHandle { id, receiver }
    }

    /// Register a callback observer.
    pub fn observe(&self, observer: Arc<dyn Observer>, filter: EventFilter) -> SubscriptionId {
        let id = self.next_id();
        self.subscriptions.write().insert(
            id,
            Subscription {
                filter,
                sink: Sink::Callback(observer),
            },
        );
        id
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            if let Sink::Channel(sender) = sub.sink {
                // Best effort
                let _ = sender.try_send(ClientEvent::Dropped {
                    reason: DropReason::Unsubscribed,
                });
            }
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    // --- Broadcasting ---

    /// Broadcast a recomputed view.
    pub fn broadcast_view(&self, view: &[Item]) {
        self.broadcast(ClientEvent::SnapshotChanged {
            view: view.to_vec(),
        });
    }

    /// Broadcast a recomputed category set.
    pub fn broadcast_categories(&self, categories: &BTreeSet<String>) {
        self.broadcast(ClientEvent::CategoriesChanged {
            categories: categories.clone(),
        });
    }

    /// Broadcast a failure message.
    pub fn broadcast_error(&self, message: &str) {
        self.broadcast(ClientEvent::Error {
            message: message.to_string(),
        });
    }

    /// Internal broadcast helper. Drops channel subscribers that fail to
    /// receive; callbacks run after the subscription lock is released.
    fn broadcast(&self, event: ClientEvent) {
        let mut to_remove = Vec::new();
        let mut callbacks = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if !sub.filter.wants(&event) {
                    continue;
                }
                match &sub.sink {
                    Sink::Channel(sender) => {
                        if let Err(reason) = Subscription::try_send(sender, event.clone()) {
                            to_remove.push((*id, reason));
                        }
                    }
                    Sink::Callback(observer) => callbacks.push(Arc::clone(observer)),
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for (id, reason) in to_remove {
                tracing::warn!(subscription = id.0, ?reason, "dropping subscriber");
                if let Some(Subscription {
                    sink: Sink::Channel(sender),
                    ..
                }) = subs.remove(&id)
                {
                    // Might fail, that's ok
                    let _ = sender.try_send(ClientEvent::Dropped { reason });
                }
            }
        }

        for observer in callbacks {
            match &event {
                ClientEvent::SnapshotChanged { view } => observer.on_snapshot_changed(view),
                ClientEvent::CategoriesChanged { categories } => {
                    observer.on_categories_changed(categories)
                }
                ClientEvent::Error { message } => observer.on_error(message),
                ClientEvent::Dropped { .. } => {}
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
