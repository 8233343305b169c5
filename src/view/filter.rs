//! Client-side filter evaluation.

use crate::types::Item;

/// User-selected filter predicates. All of them are optional; the default
/// state keeps every item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring matched against the name.
    pub query: String,
    /// Case-insensitive exact category match, ignoring surrounding whitespace
    /// on both sides. Empty means no constraint.
    pub category: String,
    /// Keep only items at or under their reorder threshold.
    pub below_min_only: bool,
}

impl FilterState {
    /// Filter by name.
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Filter by category.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    /// Only items below their minimum.
    pub fn below_min() -> Self {
        Self {
            below_min_only: true,
            ..Default::default()
        }
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.category.trim().is_empty() && !self.below_min_only
    }

    /// Check whether an item passes every active predicate.
    pub fn matches(&self, item: &Item) -> bool {
        let query = self.query.trim().to_lowercase();
        let category = self.category.trim().to_lowercase();
        Self::matches_normalized(item, &query, &category, self.below_min_only)
    }

    fn matches_normalized(item: &Item, query: &str, category: &str, below_min_only: bool) -> bool {
        if !query.is_empty() && !item.name.to_lowercase().contains(query) {
            return false;
        }

        if !category.is_empty() && item.category_str().trim().to_lowercase() != category {
            return false;
        }

        if below_min_only && !item.is_below_min() {
            return false;
        }

        true
    }
}

/// Apply a filter to a snapshot, preserving snapshot order.
pub fn apply_filter(items: &[Item], filter: &FilterState) -> Vec<Item> {
    let query = filter.query.trim().to_lowercase();
    let category = filter.category.trim().to_lowercase();

    items
        .iter()
        .filter(|item| {
            FilterState::matches_normalized(item, &query, &category, filter.below_min_only)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    fn item(id: u64, name: &str, category: Option<&str>, quantity: f64, min: f64) -> Item {
        Item {
            id: ItemId(id),
            name: name.to_string(),
            category: category.map(str::to_string),
            quantity,
            unit: "ud".to_string(),
            expiry_date: None,
            min_quantity: min,
            notes: None,
        }
    }

    fn pantry() -> Vec<Item> {
        vec![
            item(1, "Rice", Some("Grains"), 2.0, 5.0),
            item(2, "Brown rice", Some("grains"), 8.0, 1.0),
            item(3, "Milk", Some("Dairy"), 1.0, 1.0),
            item(4, "Salt", None, 3.0, 0.0),
        ]
    }

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|i| i.id.0).collect()
    }

    #[test]
    fn test_default_filter_is_identity() {
        let items = pantry();
        assert_eq!(apply_filter(&items, &FilterState::default()), items);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let items = pantry();
        let view = apply_filter(&items, &FilterState::query("  RICE "));
        assert_eq!(ids(&view), vec![1, 2]);
    }

    #[test]
    fn test_whitespace_query_is_ignored() {
        let items = pantry();
        let view = apply_filter(&items, &FilterState::query("   "));
        assert_eq!(view.len(), items.len());
    }

    #[test]
    fn test_category_is_case_insensitive_exact() {
        let items = pantry();
        let view = apply_filter(&items, &FilterState::category("GRAINS"));
        assert_eq!(ids(&view), vec![1, 2]);

        // Prefix of a category is not a match
        let view = apply_filter(&items, &FilterState::category("Grain"));
        assert!(view.is_empty());
    }

    #[test]
    fn test_padded_category_matches_trimmed_selector() {
        let items = vec![item(4, "Beans", Some(" Legumes "), 3.0, 1.0)];
        let view = apply_filter(&items, &FilterState::category("legumes"));
        assert_eq!(ids(&view), vec![4]);
    }

    #[test]
    fn test_absent_category_never_matches_selector() {
        let items = pantry();
        let view = apply_filter(&items, &FilterState::category("Salt"));
        assert!(view.is_empty());
    }

    #[test]
    fn test_below_min_includes_equal() {
        let items = pantry();
        let view = apply_filter(&items, &FilterState::below_min());
        assert_eq!(ids(&view), vec![1, 3]);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let items = pantry();
        let filter = FilterState {
            query: "rice".to_string(),
            category: "grains".to_string(),
            below_min_only: true,
        };
        assert_eq!(ids(&apply_filter(&items, &filter)), vec![1]);
        assert!(filter.matches(&items[0]));
        assert!(!filter.matches(&items[1]));
    }

    #[test]
    fn test_single_rice_below_min() {
        let items = vec![item(1, "Rice", Some("Grains"), 2.0, 5.0)];
        let view = apply_filter(&items, &FilterState::below_min());
        assert_eq!(ids(&view), vec![1]);
    }

    #[test]
    fn test_is_empty() {
        assert!(FilterState::default().is_empty());
        assert!(FilterState::query("  ").is_empty());
        assert!(!FilterState::below_min().is_empty());
    }
}
