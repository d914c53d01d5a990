use std::collections::{HashMap, HashSet};
use std::fmt;

use super::types::{Category, EquipmentItem};

/// A single inconsistency found while loading configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    /// Item name or rule the issue belongs to
    pub subject: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Check catalog records against each other.
///
/// Returns every issue found rather than stopping at the first, so a broken
/// catalog can be fixed in one pass.
pub fn validate_items(items: &[EquipmentItem]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.name.as_str()) {
            issues.push(ConfigIssue::new(&item.name, "duplicate item name"));
        }
    }

    let beds: HashSet<&str> = items
        .iter()
        .filter(|i| i.category == Category::Bed)
        .map(|i| i.name.as_str())
        .collect();

    // bed name -> mattresses claiming to be its default
    let mut defaults: HashMap<&str, Vec<&str>> = HashMap::new();

    for item in items {
        if item.name.trim().is_empty() {
            issues.push(ConfigIssue::new("<unnamed>", "item name cannot be empty"));
        }

        if item.location.is_empty() {
            issues.push(ConfigIssue::new(&item.name, "item has no locations"));
        }

        if let (Some(min), Some(max)) = (item.min_load, item.effective_max_load()) {
            if min > max {
                issues.push(ConfigIssue::new(
                    &item.name,
                    format!("min_load {}kg exceeds max_load {}kg", min, max),
                ));
            }
        }

        if item.category != Category::Mattress {
            if item.compatible_beds.is_some() || item.default_for_beds.is_some() {
                issues.push(ConfigIssue::new(
                    &item.name,
                    format!(
                        "compatible_beds/default_for_beds are only allowed on Mattress items, found on {}",
                        item.category
                    ),
                ));
            }
            continue;
        }

        for bed in item.compatible_beds.iter().flatten() {
            if !beds.contains(bed.as_str()) {
                issues.push(ConfigIssue::new(
                    &item.name,
                    format!("compatible bed '{}' is not a Bed in the catalog", bed),
                ));
            }
        }

        for bed in item.default_for_beds.iter().flatten() {
            if !item.fits_bed(bed) {
                issues.push(ConfigIssue::new(
                    &item.name,
                    format!(
                        "marked default for '{}' but '{}' is not in compatible_beds",
                        bed, bed
                    ),
                ));
            }
            defaults.entry(bed.as_str()).or_default().push(item.name.as_str());
        }
    }

    let mut contested: Vec<_> = defaults.into_iter().filter(|(_, m)| m.len() > 1).collect();
    contested.sort_by(|a, b| a.0.cmp(b.0));
    for (bed, mattresses) in contested {
        issues.push(ConfigIssue::new(
            bed,
            format!("has more than one default mattress: {}", mattresses.join(", ")),
        ));
    }

    issues
}
