//! Equipment catalog: immutable reference data loaded once at startup.
//!
//! The catalog answers "what exists"; deciding what a given patient may use
//! is the eligibility filter's job (see [`crate::engine::eligibility`]).

mod loader;
mod types;
mod validation;

pub use loader::{default_catalog, load_catalog, parse_catalog};
pub use types::*;
pub use validation::{validate_items, ConfigIssue};

use std::collections::HashMap;

use crate::error::{EquipmentError, EquipmentResult};

/// Validated, read-only equipment catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<EquipmentItem>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, failing fast on any configuration inconsistency.
    pub fn from_items(items: Vec<EquipmentItem>) -> EquipmentResult<Self> {
        let issues = validate_items(&items);
        if !issues.is_empty() {
            return Err(EquipmentError::InconsistentConfig(
                issues.iter().map(|i| i.to_string()).collect(),
            ));
        }

        let by_name = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.name.clone(), idx))
            .collect();

        Ok(Self { items, by_name })
    }

    /// Look up an item by name.
    pub fn get(&self, name: &str) -> EquipmentResult<&EquipmentItem> {
        self.find(name)
            .ok_or_else(|| EquipmentError::NotFound(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&EquipmentItem> {
        self.by_name.get(name).map(|&idx| &self.items[idx])
    }

    /// All items of a category in catalog order, regardless of eligibility.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &EquipmentItem> + '_ {
        self.items.iter().filter(move |i| i.category == category)
    }

    /// The mattress registered as the default pairing for `bed`.
    pub fn default_mattress_for(&self, bed: &str) -> Option<&EquipmentItem> {
        self.by_category(Category::Mattress)
            .find(|m| m.fits_bed(bed) && m.is_default_for(bed))
    }

    pub fn items(&self) -> &[EquipmentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
