use std::collections::BTreeMap;

use super::repo::StarredRepo;

/// Fallback category for repositories no catalog entry fits.
pub const OTHER_CATEGORY: &str = "Other";

/// Current starred repositories keyed by `owner/name`.
pub type Snapshot = BTreeMap<String, StarredRepo>;

/// Category name to the description used as classification guidance.
pub type Catalog = BTreeMap<String, String>;

/// Repository `owner/name` to the categories it was sorted into.
pub type Assignments = BTreeMap<String, Vec<String>>;

pub fn is_known_category(catalog: &Catalog, category: &str) -> bool {
    category == OTHER_CATEGORY || catalog.contains_key(category)
}
