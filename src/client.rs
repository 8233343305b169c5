//! The inventory client: snapshot, filters, and remote mutations.

use crate::error::{Result, SyncError};
use crate::events::{
    EventFilter, Observer, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
use crate::form::ItemForm;
use crate::gateway::{Gateway, HttpGateway, Request};
use crate::settings::{Settings, SettingsStore};
use crate::types::{Item, ItemId, ItemPatch, NewItem};
use crate::view::{apply_filter, derive_categories, FilterState};
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeSet;
use std::sync::Arc;

const ITEMS_PATH: &str = "/items";

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Run each mutation and its reload under a per-client lock, so
    /// overlapping mutations apply in call order.
    pub serialize_mutations: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            serialize_mutations: true,
        }
    }
}

/// State owned by the client. Replaced wholesale on reload.
#[derive(Default)]
struct ClientState {
    snapshot: Arc<Vec<Item>>,
    filter: FilterState,
    categories: BTreeSet<String>,
}

impl ClientState {
    fn view(&self) -> Vec<Item> {
        apply_filter(&self.snapshot, &self.filter)
    }
}

/// Keeps a local snapshot of the remote item collection in sync.
///
/// Every mutation is a single remote call followed by a full reload; the
/// snapshot is never patched locally, so the server stays the only source
/// of truth. Observers are told about view and category changes and about
/// failures.
pub struct InventoryClient<G: Gateway> {
    config: ClientConfig,
    gateway: G,
    state: Mutex<ClientState>,
    events: SubscriptionManager,
    /// Held across mutation + reload when mutations are serialized.
    mutation_lock: Mutex<()>,
}

impl<G: Gateway> InventoryClient<G> {
    /// Create a client with the default configuration. The snapshot starts
    /// empty until [`load`](Self::load) succeeds.
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, ClientConfig::default())
    }

    pub fn with_config(gateway: G, config: ClientConfig) -> Self {
        Self {
            config,
            gateway,
            state: Mutex::new(ClientState::default()),
            events: SubscriptionManager::new(),
            mutation_lock: Mutex::new(()),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- Subscriptions ---

    /// Subscribe to client events over a bounded channel.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.events.subscribe(config)
    }

    /// Register a callback observer for every event kind.
    pub fn observe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        self.events.observe(observer, EventFilter::all())
    }

    /// Register a callback observer for selected event kinds.
    pub fn observe_filtered(
        &self,
        observer: Arc<dyn Observer>,
        filter: EventFilter,
    ) -> SubscriptionId {
        self.events.observe(observer, filter)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    // --- Reads ---

    /// The last successfully loaded snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Item>> {
        Arc::clone(&self.state.lock().snapshot)
    }

    /// Look an item up in the current snapshot.
    pub fn find(&self, id: ItemId) -> Option<Item> {
        self.state
            .lock()
            .snapshot
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// The snapshot with the current filter applied.
    pub fn view(&self) -> Vec<Item> {
        self.state.lock().view()
    }

    pub fn filter(&self) -> FilterState {
        self.state.lock().filter.clone()
    }

    /// Categories derived at the last reload that refilled them.
    pub fn categories(&self) -> BTreeSet<String> {
        self.state.lock().categories.clone()
    }

    // --- Snapshot loading ---

    /// Fetch the full collection and replace the snapshot.
    ///
    /// With `refill_categories` the category set is recomputed from the new
    /// snapshot. The view is always recomputed. On failure the previous
    /// snapshot stays in effect.
    pub fn load(&self, refill_categories: bool) -> Result<()> {
        self.report(self.reload(refill_categories))
    }

    fn reload(&self, refill_categories: bool) -> Result<()> {
        let items = self.fetch_items()?;

        let total = items.len();
        let (view, categories) = {
            let mut state = self.state.lock();
            state.snapshot = Arc::new(items);
            let categories = if refill_categories {
                state.categories = derive_categories(&state.snapshot);
                Some(state.categories.clone())
            } else {
                None
            };
            (state.view(), categories)
        };

        tracing::debug!(
            items = total,
            visible = view.len(),
            refill_categories,
            "snapshot reloaded"
        );

        if let Some(categories) = categories {
            self.events.broadcast_categories(&categories);
        }
        self.events.broadcast_view(&view);
        Ok(())
    }

    fn fetch_items(&self) -> Result<Vec<Item>> {
        match self.gateway.send(Request::get(ITEMS_PATH))? {
            Some(serde_json::Value::Array(rows)) => {
                let total = rows.len();
                let items = rows
                    .into_iter()
                    .filter(|row| !row.get("id").map_or(true, serde_json::Value::is_null))
                    .map(|row| {
                        serde_json::from_value(row)
                            .map_err(|e| SyncError::Deserialization(e.to_string()))
                    })
                    .collect::<Result<Vec<Item>>>()?;
                // Rows the service could not assign an id to are unaddressable
                if items.len() < total {
                    tracing::warn!(skipped = total - items.len(), "skipping listed items without an id");
                }
                Ok(items)
            }
            other => {
                tracing::warn!(payload = ?other, "item listing is not an array, using empty snapshot");
                Ok(Vec::new())
            }
        }
    }

    // --- Mutations ---

    /// Create an item, reload, and select its category in the filter so the
    /// new item is visible.
    pub fn create(&self, item: NewItem) -> Result<Item> {
        self.report(self.create_item(item))
    }

    fn create_item(&self, item: NewItem) -> Result<Item> {
        item.validate()?;
        let _guard = self.mutation_guard();

        let response = self.gateway.send(Request::post_json(ITEMS_PATH, &item)?)?;
        let created = decode_item(response)?;
        tracing::info!(id = %created.id, name = %created.name, "item created");

        self.reload(true)?;

        let category = created.category_str().trim();
        if !category.is_empty() {
            self.update_filter(|filter| filter.category = category.to_string());
        }

        Ok(created)
    }

    /// Send a validated partial update, then reload.
    pub fn update(&self, id: ItemId, patch: ItemPatch) -> Result<Item> {
        self.report(self.update_item(id, patch))
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Item> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(SyncError::Validation("nothing to update".to_string()));
        }
        let _guard = self.mutation_guard();
        self.send_update(id, &patch)
    }

    /// Add one to an item's quantity.
    pub fn increment(&self, id: ItemId) -> Result<Item> {
        self.report(self.adjust_quantity(id, |quantity| quantity + 1.0))
    }

    /// Take one from an item's quantity, never going below zero.
    pub fn decrement(&self, id: ItemId) -> Result<Item> {
        self.report(self.adjust_quantity(id, |quantity| (quantity - 1.0).max(0.0)))
    }

    fn adjust_quantity(&self, id: ItemId, adjust: impl FnOnce(f64) -> f64) -> Result<Item> {
        // Look up under the guard so a serialized adjustment sees the
        // snapshot reloaded by the previous one.
        let _guard = self.mutation_guard();
        let item = self.find(id).ok_or(SyncError::NotFound(id))?;
        self.send_update(id, &ItemPatch::quantity(adjust(item.quantity)))
    }

    fn send_update(&self, id: ItemId, patch: &ItemPatch) -> Result<Item> {
        let response = self.gateway.send(Request::put_json(item_path(id), patch)?)?;
        let updated = decode_item(response)?;
        tracing::info!(id = %updated.id, "item updated");

        self.reload(true)?;
        Ok(updated)
    }

    /// Delete an item that is part of the current snapshot, then reload.
    ///
    /// Asking the user for confirmation is up to the caller; see
    /// [`delete_confirmed`](Self::delete_confirmed).
    pub fn delete(&self, id: ItemId) -> Result<()> {
        self.report(self.delete_item(id))
    }

    /// Look the item up, ask `confirm`, and delete only if it agrees.
    /// Returns whether the item was deleted.
    pub fn delete_confirmed(
        &self,
        id: ItemId,
        confirm: impl FnOnce(&Item) -> bool,
    ) -> Result<bool> {
        let item = match self.find(id) {
            Some(item) => item,
            None => return self.report(Err(SyncError::NotFound(id))),
        };
        if !confirm(&item) {
            tracing::debug!(%id, "delete cancelled");
            return Ok(false);
        }
        self.delete(id)?;
        Ok(true)
    }

    fn delete_item(&self, id: ItemId) -> Result<()> {
        let _guard = self.mutation_guard();
        if self.find(id).is_none() {
            return Err(SyncError::NotFound(id));
        }

        self.gateway.send(Request::delete(item_path(id)))?;
        tracing::info!(%id, "item deleted");

        self.reload(true)
    }

    /// Submit the add/edit form: update when it carries an id, create
    /// otherwise.
    pub fn submit_form(&self, form: &ItemForm) -> Result<Item> {
        self.report(self.submit(form))
    }

    fn submit(&self, form: &ItemForm) -> Result<Item> {
        let payload = form.to_new_item()?;
        match form.item_id()? {
            Some(id) => self.update_item(id, payload.into()),
            None => self.create_item(payload),
        }
    }

    // --- Filters ---

    /// Replace the whole filter state and recompute the view.
    pub fn set_filter(&self, filter: FilterState) -> Vec<Item> {
        self.update_filter(|current| *current = filter)
    }

    pub fn set_query(&self, query: impl Into<String>) -> Vec<Item> {
        let query = query.into();
        self.update_filter(|filter| filter.query = query)
    }

    pub fn set_category(&self, category: impl Into<String>) -> Vec<Item> {
        let category = category.into();
        self.update_filter(|filter| filter.category = category)
    }

    pub fn set_below_min_only(&self, below_min_only: bool) -> Vec<Item> {
        self.update_filter(|filter| filter.below_min_only = below_min_only)
    }

    /// Reset every filter; the view becomes the whole snapshot.
    pub fn clear_filters(&self) -> Vec<Item> {
        self.set_filter(FilterState::default())
    }

    /// Re-apply the current filter and notify observers.
    pub fn refresh_view(&self) -> Vec<Item> {
        self.update_filter(|_| {})
    }

    fn update_filter(&self, change: impl FnOnce(&mut FilterState)) -> Vec<Item> {
        let view = {
            let mut state = self.state.lock();
            change(&mut state.filter);
            state.view()
        };
        self.events.broadcast_view(&view);
        view
    }

    // --- Helpers ---

    fn mutation_guard(&self) -> Option<MutexGuard<'_, ()>> {
        if self.config.serialize_mutations {
            Some(self.mutation_lock.lock())
        } else {
            None
        }
    }

    /// Tell observers about a failure before handing it back.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ref err) = result {
            tracing::warn!(error = %err, "inventory operation failed");
            self.events.broadcast_error(&err.to_string());
        }
        result
    }
}

impl InventoryClient<HttpGateway> {
    /// Save connection settings, point the gateway at them, and reload with
    /// categories. Returns the settings as saved (trimmed).
    ///
    /// If saving fails the gateway keeps its old settings. A failed reload
    /// leaves the new settings in place.
    pub fn apply_settings(&self, store: &SettingsStore, settings: Settings) -> Result<Settings> {
        self.report(self.save_and_reload(store, settings))
    }

    fn save_and_reload(&self, store: &SettingsStore, settings: Settings) -> Result<Settings> {
        let _guard = self.mutation_guard();
        let saved = store.save(&settings)?;
        self.gateway.set_settings(saved.clone());
        tracing::info!(base_url = %saved.base_url, "connection settings applied");

        self.reload(true)?;
        Ok(saved)
    }
}

fn item_path(id: ItemId) -> String {
    format!("{}/{}", ITEMS_PATH, id)
}

fn decode_item(response: Option<serde_json::Value>) -> Result<Item> {
    let value = response
        .ok_or_else(|| SyncError::Deserialization("expected an item, got no content".to_string()))?;
    serde_json::from_value(value).map_err(|e| SyncError::Deserialization(e.to_string()))
}
