//! Type definitions for the equipment catalog.
//!
//! Items are deserialized from `config/catalog.toml` and serialized to the
//! shell when it renders a category's choices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CATEGORY VOCABULARY
// =============================================================================

/// The fixed equipment category vocabulary.
///
/// Declaration order is the order categories are listed in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Bed,
    Mattress,
    Mat,
    Hoist,
    Slings,
    Commode,
    #[serde(rename = "Walking Aids")]
    WalkingAids,
    Wheelchairs,
    #[serde(rename = "Bedside Chairs")]
    BedsideChairs,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Bed,
        Category::Mattress,
        Category::Mat,
        Category::Hoist,
        Category::Slings,
        Category::Commode,
        Category::WalkingAids,
        Category::Wheelchairs,
        Category::BedsideChairs,
        Category::Accessories,
    ];

    /// Display name, matching the catalog spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bed => "Bed",
            Category::Mattress => "Mattress",
            Category::Mat => "Mat",
            Category::Hoist => "Hoist",
            Category::Slings => "Slings",
            Category::Commode => "Commode",
            Category::WalkingAids => "Walking Aids",
            Category::Wheelchairs => "Wheelchairs",
            Category::BedsideChairs => "Bedside Chairs",
            Category::Accessories => "Accessories",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Category> {
        let wanted = name.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// Root document of a catalog TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub items: Vec<EquipmentItem>,
}

/// A single piece of equipment in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentItem {
    /// Unique item name, also the value stored in a selection
    pub name: String,
    pub category: Category,
    /// Location codes where the item can be procured
    pub location: Vec<String>,
    /// Minimum patient weight in kg
    #[serde(default)]
    pub min_load: Option<u32>,
    /// Safe working load in kg. `0` means no upper limit.
    #[serde(default)]
    pub max_load: Option<u32>,
    /// Overall width in cm
    #[serde(default)]
    pub width: Option<u32>,
    /// Seat width in cm
    #[serde(default)]
    pub seat_width: Option<u32>,
    /// Beds this mattress fits (mattresses only)
    #[serde(default)]
    pub compatible_beds: Option<Vec<String>>,
    /// Beds this mattress ships with (mattresses only)
    #[serde(default)]
    pub default_for_beds: Option<Vec<String>>,
    /// Procurement instruction keyed by site name
    #[serde(default)]
    pub procurement: BTreeMap<String, String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EquipmentItem {
    pub fn is_at(&self, location: &str) -> bool {
        self.location.iter().any(|l| l == location)
    }

    /// Upper load limit, with `0` normalised to unbounded.
    pub fn effective_max_load(&self) -> Option<u32> {
        self.max_load.filter(|&max| max > 0)
    }

    /// True when the item's load limits admit a patient of `weight_kg`.
    pub fn supports_weight(&self, weight_kg: u32) -> bool {
        if let Some(min) = self.min_load {
            if weight_kg < min {
                return false;
            }
        }
        self.effective_max_load().map_or(true, |max| weight_kg <= max)
    }

    pub fn fits_bed(&self, bed: &str) -> bool {
        self.compatible_beds
            .as_ref()
            .is_some_and(|beds| beds.iter().any(|b| b == bed))
    }

    pub fn is_default_for(&self, bed: &str) -> bool {
        self.default_for_beds
            .as_ref()
            .is_some_and(|beds| beds.iter().any(|b| b == bed))
    }

    pub fn procurement_for(&self, site: &str) -> Option<&str> {
        self.procurement.get(site).map(|s| s.as_str())
    }
}
