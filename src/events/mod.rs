//! Event subscriptions for client state changes.
//!
//! Consumers are told when:
//! - the rendered view changes (`SnapshotChanged`)
//! - the category set is recomputed (`CategoriesChanged`)
//! - an operation fails (`Error`)
//!
//! Two kinds of sinks are supported: bounded channels, which drop slow
//! subscribers, and callback observers invoked on the calling thread.
//!
//! # Example
//!
//! ```ignore
//! let handle = client.subscribe(SubscriptionConfig::default());
//!
//! client.load(true)?;
//! while let Ok(event) = handle.try_recv() {
//!     match event {
//!         ClientEvent::SnapshotChanged { view } => render(&view),
//!         ClientEvent::CategoriesChanged { categories } => fill_selector(&categories),
//!         ClientEvent::Error { message } => alert(&message),
//!         ClientEvent::Dropped { .. } => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    ClientEvent, DropReason, EventFilter, Observer, SubscriptionConfig, SubscriptionHandle,
    SubscriptionId,
};
