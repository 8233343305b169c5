//! Core types for the inventory client.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unit label used when an item is created without one.
pub const DEFAULT_UNIT: &str = "ud";

/// Server-assigned identifier for an item.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single inventory item as returned by the remote service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (assigned by the server).
    pub id: ItemId,

    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,

    /// `None` when the item has no category at all.
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "nullable_amount")]
    pub quantity: f64,

    #[serde(default, deserialize_with = "nullable_string")]
    pub unit: String,

    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "date_only")]
    pub expiry_date: Option<String>,

    /// Reorder threshold.
    #[serde(default, deserialize_with = "nullable_amount")]
    pub min_quantity: f64,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Item {
    /// True when the quantity has reached or fallen under the reorder threshold.
    pub fn is_below_min(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Category text, empty when absent.
    pub fn category_str(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

/// Payload for creating a new item (everything but the id).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewItem {
    pub name: String,
    pub category: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: Option<String>,
    pub min_quantity: f64,
    pub notes: Option<String>,
}

impl NewItem {
    /// Create a payload with the given name and default values elsewhere.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            quantity: 0.0,
            unit: DEFAULT_UNIT.to_string(),
            expiry_date: None,
            min_quantity: 0.0,
            notes: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_min_quantity(mut self, min_quantity: f64) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_expiry_date(mut self, date: impl Into<String>) -> Self {
        self.expiry_date = Some(date.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check the payload before it is sent.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_amount(self.quantity)?;
        validate_amount(self.min_quantity)
    }
}

/// Partial update for an existing item. Absent fields are left untouched
/// by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemPatch {
    /// A patch that only sets the quantity.
    pub fn quantity(quantity: f64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }

    /// Check the fields that are present.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        if let Some(quantity) = self.quantity {
            validate_amount(quantity)?;
        }
        if let Some(min_quantity) = self.min_quantity {
            validate_amount(min_quantity)?;
        }
        Ok(())
    }
}

impl From<NewItem> for ItemPatch {
    fn from(item: NewItem) -> Self {
        Self {
            name: Some(item.name),
            category: item.category,
            quantity: Some(item.quantity),
            unit: Some(item.unit),
            expiry_date: item.expiry_date,
            min_quantity: Some(item.min_quantity),
            notes: item.notes,
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SyncError::Validation("name is required".to_string()));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_nan() || amount < 0.0 {
        return Err(SyncError::Validation(
            "negative quantities are not allowed".to_string(),
        ));
    }
    Ok(())
}

/// Truncate an ISO date or datetime string to its date part.
pub fn truncate_date(value: &str) -> &str {
    match value.char_indices().nth(10) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn date_only<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|date| truncate_date(&date).to_string()))
}
