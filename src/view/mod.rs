//! Derived views over the item snapshot.
//!
//! Both derivations are pure functions of a snapshot:
//! - the filtered view shown to the user
//! - the set of known categories used to populate selectors

mod categories;
mod filter;

pub use categories::derive_categories;
pub use filter::{apply_filter, FilterState};
