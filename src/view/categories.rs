//! Category derivation.

use crate::types::Item;
use std::collections::BTreeSet;

/// Collect the distinct, non-empty categories present in a snapshot.
///
/// Values are trimmed; duplicates collapse only when exactly equal (matching
/// is case-insensitive elsewhere, but the set keeps the spelling it saw).
pub fn derive_categories(items: &[Item]) -> BTreeSet<String> {
    items
        .iter()
        .filter_map(|item| item.category.as_deref())
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect()
}
