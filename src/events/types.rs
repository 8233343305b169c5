//! Subscription types for client state changes.

use crate::types::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for a channel subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 256
    pub buffer_size: usize,

    /// Which events to deliver.
    pub filter: EventFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            filter: EventFilter::all(),
        }
    }
}

/// Selects the event kinds a subscriber receives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub include_view: bool,
    pub include_categories: bool,
    pub include_errors: bool,
}

impl EventFilter {
    /// Only view changes.
    pub fn view() -> Self {
        Self {
            include_view: true,
            ..Default::default()
        }
    }

    /// Only category recomputations.
    pub fn categories() -> Self {
        Self {
            include_categories: true,
            ..Default::default()
        }
    }

    /// Only failures.
    pub fn errors() -> Self {
        Self {
            include_errors: true,
            ..Default::default()
        }
    }

    /// Everything.
    pub fn all() -> Self {
        Self {
            include_view: true,
            include_categories: true,
            include_errors: true,
        }
    }

    pub(crate) fn wants(&self, event: &ClientEvent) -> bool {
        match event {
            ClientEvent::SnapshotChanged { .. } => self.include_view,
            ClientEvent::CategoriesChanged { .. } => self.include_categories,
            ClientEvent::Error { .. } => self.include_errors,
            ClientEvent::Dropped { .. } => true,
        }
    }
}

/// Events emitted by the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The filtered view was recomputed.
    SnapshotChanged { view: Vec<Item> },

    /// The category set was recomputed from a fresh snapshot.
    CategoriesChanged { categories: BTreeSet<String> },

    /// An operation failed.
    Error { message: String },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Receiver was dropped.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Callback-style observer. Every method defaults to doing nothing.
///
/// Callbacks run on the thread that triggered the change, after the client
/// has released its state lock. They may read client state or change filters;
/// starting a mutation from a callback deadlocks while mutations are serialized.
pub trait Observer: Send + Sync {
    fn on_snapshot_changed(&self, _view: &[Item]) {}
    fn on_categories_changed(&self, _categories: &BTreeSet<String>) {}
    fn on_error(&self, _message: &str) {}
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to a channel subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<ClientEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ClientEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ClientEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<ClientEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Take every event buffered so far.
    pub fn drain(&self) -> Vec<ClientEvent> {
        self.receiver.try_iter().collect()
    }
}
