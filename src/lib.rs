//! # Pantry Sync
//!
//! Client-side synchronization and filtering for a remote pantry inventory.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: the full local copy of the remote item collection, replaced
//!   wholesale on every reload
//! - **View**: the snapshot with the user's filters applied
//! - **Categories**: distinct category names derived from the snapshot
//! - **Reload**: every create/update/delete is followed by a full re-fetch
//!
//! ## Example
//!
//! ```ignore
//! use pantry_sync::{HttpGateway, InventoryClient, NewItem, SettingsStore};
//!
//! let settings = SettingsStore::new("./pantry.json").load()?;
//! let client = InventoryClient::new(HttpGateway::new(settings)?);
//!
//! client.load(true)?;
//! client.create(NewItem::new("Beans").with_category("Legumes").with_quantity(3.0))?;
//!
//! // Only what is running low
//! let low = client.set_below_min_only(true);
//! ```

pub mod client;
pub mod error;
pub mod events;
pub mod form;
pub mod gateway;
pub mod settings;
pub mod types;
pub mod view;

// Re-exports
pub use client::{ClientConfig, InventoryClient};
pub use error::{Result, SyncError};
pub use events::{
    ClientEvent, DropReason, EventFilter, Observer, SubscriptionConfig, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use form::ItemForm;
pub use gateway::{
    interpret_response, Gateway, HttpGateway, MemoryGateway, Method, Request, RequestBody,
    API_KEY_HEADER,
};
pub use settings::{Settings, SettingsStore, DEFAULT_BASE_URL};
pub use types::*;
pub use view::{apply_filter, derive_categories, FilterState};
