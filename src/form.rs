//! Add/edit form translation.
//!
//! The form holds raw text exactly as a user typed it; turning it into a
//! payload applies the same normalization the service expects.

use crate::error::{Result, SyncError};
use crate::types::{truncate_date, Item, ItemId, NewItem, DEFAULT_UNIT};

/// Raw contents of the item form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemForm {
    /// Empty for a new item.
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: String,
    pub unit: String,
    pub expiry_date: String,
    pub min_quantity: String,
    pub notes: String,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self::blank()
    }
}

impl ItemForm {
    /// A cleared form.
    pub fn blank() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            category: String::new(),
            quantity: "0".to_string(),
            unit: DEFAULT_UNIT.to_string(),
            expiry_date: String::new(),
            min_quantity: "0".to_string(),
            notes: String::new(),
        }
    }

    /// Fill the form for editing an existing item.
    pub fn from_item(item: &Item) -> Self {
        let unit = if item.unit.is_empty() {
            DEFAULT_UNIT.to_string()
        } else {
            item.unit.clone()
        };

        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            category: item.category.clone().unwrap_or_default(),
            quantity: format_amount(item.quantity),
            unit,
            expiry_date: item
                .expiry_date
                .as_deref()
                .map(truncate_date)
                .unwrap_or("")
                .to_string(),
            min_quantity: format_amount(item.min_quantity),
            notes: item.notes.clone().unwrap_or_default(),
        }
    }

    /// Id of the item being edited, `None` for a new one.
    pub fn item_id(&self) -> Result<Option<ItemId>> {
        let id = self.id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        id.parse::<u64>()
            .map(|id| Some(ItemId(id)))
            .map_err(|_| SyncError::Validation(format!("invalid item id: {}", id)))
    }

    /// Build a validated payload from the form contents.
    pub fn to_new_item(&self) -> Result<NewItem> {
        let unit = self.unit.trim();
        let item = NewItem {
            name: self.name.trim().to_string(),
            category: non_empty(&self.category),
            quantity: parse_amount("quantity", &self.quantity)?,
            unit: if unit.is_empty() {
                DEFAULT_UNIT.to_string()
            } else {
                unit.to_string()
            },
            expiry_date: non_empty(&self.expiry_date),
            min_quantity: parse_amount("min_quantity", &self.min_quantity)?,
            notes: non_empty(&self.notes),
        };

        item.validate()?;
        Ok(item)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_amount(field: &str, value: &str) -> Result<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| SyncError::Validation(format!("{} is not a number: {}", field, value)))
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        amount.to_string()
    }
}
