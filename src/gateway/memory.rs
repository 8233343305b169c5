//! In-memory gateway that behaves like the inventory service.
//!
//! Useful for offline use and for exercising the client without a server.
//! Items are kept newest-first, ids are `max + 1`, updates are partial, and
//! absent text fields are stored as empty strings, the way the service
//! normalizes them.

use super::{to_json, Gateway, Method, Request, RequestBody};
use crate::error::{Result, SyncError};
use crate::types::{Item, ItemId, DEFAULT_UNIT};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Fields accepted by create and update calls.
#[derive(Debug, Default, Deserialize)]
struct ItemFields {
    name: Option<String>,
    category: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    expiry_date: Option<String>,
    min_quantity: Option<f64>,
    notes: Option<String>,
}

impl ItemFields {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.expiry_date.is_none()
            && self.min_quantity.is_none()
            && self.notes.is_none()
    }

    fn check(&self) -> Result<()> {
        if self.quantity.map(|q| q < 0.0).unwrap_or(false)
            || self.min_quantity.map(|q| q < 0.0).unwrap_or(false)
        {
            return Err(detail(422, "Quantities must be greater than or equal to 0."));
        }
        if let Some(ref name) = self.name {
            if name.is_empty() {
                return Err(detail(422, "Name must not be empty."));
            }
        }
        Ok(())
    }
}

fn detail(status: u16, message: &str) -> SyncError {
    SyncError::remote(status, serde_json::json!({ "detail": message }).to_string())
}

/// In-memory inventory service.
#[derive(Default)]
pub struct MemoryGateway {
    items: Mutex<Vec<Item>>,
    requests: Mutex<Vec<Request>>,
    /// Pending injected failures, optionally limited to one method.
    failures: Mutex<VecDeque<(Option<Method>, SyncError)>>,
    latency: Option<Duration>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given items, in service order.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    /// Delay every request, to widen race windows in tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Current contents of the service.
    pub fn items(&self) -> Vec<Item> {
        self.items.lock().clone()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Make the next request fail with the given status and body.
    pub fn fail_next(&self, status: u16, body: &str) {
        self.failures
            .lock()
            .push_back((None, SyncError::remote(status, body)));
    }

    /// Make the next request with the given method fail.
    pub fn fail_next_for(&self, method: Method, status: u16, body: &str) {
        self.failures
            .lock()
            .push_back((Some(method), SyncError::remote(status, body)));
    }

    /// Make the next request fail as if the service were unreachable.
    pub fn disconnect_next(&self) {
        self.failures
            .lock()
            .push_back((None, SyncError::transport("connection refused")));
    }

    fn parse_id(segment: &str) -> Result<ItemId> {
        segment
            .parse::<u64>()
            .map(ItemId)
            .map_err(|_| detail(422, "Item id must be an integer."))
    }

    fn parse_fields(body: Option<RequestBody>) -> Result<ItemFields> {
        match body {
            Some(RequestBody::Json(value)) => serde_json::from_value(value)
                .map_err(|e| detail(422, &e.to_string())),
            Some(RequestBody::Binary(_)) | None => Err(detail(422, "Field required.")),
        }
    }

    fn list(&self) -> Result<Option<serde_json::Value>> {
        let items = self.items.lock();
        Ok(Some(to_json(&*items)?))
    }

    fn create(&self, fields: ItemFields) -> Result<Option<serde_json::Value>> {
        fields.check()?;
        let name = fields.name.unwrap_or_default();
        if name.trim().is_empty() {
            return Err(detail(400, "Name is required."));
        }

        let mut items = self.items.lock();
        let next_id = items.iter().map(|item| item.id.0).max().unwrap_or(0) + 1;
        let item = Item {
            id: ItemId(next_id),
            name,
            category: Some(fields.category.unwrap_or_default()),
            quantity: fields.quantity.unwrap_or(0.0),
            unit: fields
                .unit
                .filter(|unit| !unit.is_empty())
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            expiry_date: Some(fields.expiry_date.unwrap_or_default()),
            min_quantity: fields.min_quantity.unwrap_or(0.0),
            notes: Some(fields.notes.unwrap_or_default()),
        };
        items.insert(0, item.clone());

        Ok(Some(to_json(&item)?))
    }

    fn update(&self, id: ItemId, fields: ItemFields) -> Result<Option<serde_json::Value>> {
        if fields.is_empty() {
            return Err(detail(400, "No fields to update."));
        }
        fields.check()?;

        let mut items = self.items.lock();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| detail(404, "Item not found."))?;

        if let Some(name) = fields.name {
            item.name = name;
        }
        if let Some(category) = fields.category {
            item.category = Some(category);
        }
        if let Some(quantity) = fields.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = fields.unit {
            item.unit = unit;
        }
        if let Some(expiry_date) = fields.expiry_date {
            item.expiry_date = Some(expiry_date);
        }
        if let Some(min_quantity) = fields.min_quantity {
            item.min_quantity = min_quantity;
        }
        if let Some(notes) = fields.notes {
            item.notes = Some(notes);
        }

        Ok(Some(to_json(&*item)?))
    }

    fn delete(&self, id: ItemId) -> Result<Option<serde_json::Value>> {
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(detail(404, "Item not found."));
        }
        Ok(None)
    }
}

impl Gateway for MemoryGateway {
    fn send(&self, request: Request) -> Result<Option<serde_json::Value>> {
        self.requests.lock().push(request.clone());

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        {
            let mut failures = self.failures.lock();
            let pending = failures
                .iter()
                .position(|(method, _)| method.map_or(true, |m| m == request.method));
            if let Some((_, err)) = pending.and_then(|idx| failures.remove(idx)) {
                return Err(err);
            }
        }

        let path = request.path.split('?').next().unwrap_or("");
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["items"]) => self.list(),
            (Method::Post, ["items"]) => self.create(Self::parse_fields(request.body)?),
            (Method::Put, ["items", id]) => {
                let id = Self::parse_id(id)?;
                self.update(id, Self::parse_fields(request.body)?)
            }
            (Method::Delete, ["items", id]) => self.delete(Self::parse_id(id)?),
            (_, ["items"]) | (_, ["items", _]) => Err(detail(405, "Method Not Allowed")),
            _ => Err(detail(404, "Not Found")),
        }
    }
}
