//! Type definitions for the encounter rules table.
//!
//! Every rule constant lives here, loaded from `config/rules.toml`, so that
//! thresholds and category plans have exactly one definition.

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::encounter::{CareSetting, DependencyStatus};

// =============================================================================
// CONFIGURATION TYPES (loaded from TOML)
// =============================================================================

/// Root configuration loaded from rules.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Names and thresholds for the derived support accessory
    pub accessories: AccessoryRules,
    /// The canonical location codes
    pub locations: Vec<LocationDef>,
    /// Category plans, first match wins
    pub plans: Vec<PlanRule>,
    /// ED weight bands offered instead of an exact weight
    #[serde(default)]
    pub weight_bands: Vec<WeightBand>,
    /// Static advisories shown with a plan
    #[serde(default)]
    pub advisories: Vec<AdvisoryRule>,
}

/// Constants for the support accessory rule.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessoryRules {
    /// Sling that doubles as a transfer mat (mutually exclusive with Mat)
    pub hoist_lift_sling: String,
    /// Accessory required whenever the hoist-lift sling is chosen
    pub sling_pump: String,
    /// Mat air supply below the threshold
    pub single_air_supply: String,
    /// Mat air supply at or above the threshold
    pub dual_air_supply: String,
    pub dual_air_supply_threshold_kg: u32,
}

/// A selectable location code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDef {
    pub code: String,
    pub label: String,
    /// Site name, also the key into item procurement tables
    pub site: String,
    pub setting: CareSetting,
    #[serde(default)]
    pub alert: Option<WeightAlert>,
}

/// One-time advisory shown before committing a weight at or above the
/// location's threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightAlert {
    pub threshold_kg: u32,
    pub message: String,
}

/// Required and optional categories for a setting/dependency combination.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRule {
    pub setting: CareSetting,
    /// `None` matches any dependency status
    #[serde(default)]
    pub dependency: Option<DependencyStatus>,
    pub required: Vec<Category>,
    #[serde(default)]
    pub optional: Vec<Category>,
}

impl PlanRule {
    pub fn matches(&self, setting: CareSetting, dependency: Option<DependencyStatus>) -> bool {
        self.setting == setting && self.dependency.map_or(true, |d| Some(d) == dependency)
    }
}

/// An ED weight band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightBand {
    pub label: String,
    pub min_kg: u32,
    /// `None` for the open-ended top band
    #[serde(default)]
    pub max_kg: Option<u32>,
}

/// Advisory text attached to a plan. Every filter that is set must match.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryRule {
    #[serde(default)]
    pub setting: Option<CareSetting>,
    /// Shown only when this category is in the plan
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub dependency: Option<DependencyStatus>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(setting: CareSetting, dependency: Option<DependencyStatus>) -> PlanRule {
        PlanRule {
            setting,
            dependency,
            required: vec![Category::Bed],
            optional: vec![],
        }
    }

    #[test]
    fn test_plan_rule_without_dependency_matches_any() {
        let r = rule(CareSetting::Emergency, None);
        assert!(r.matches(CareSetting::Emergency, None));
        assert!(r.matches(CareSetting::Emergency, Some(DependencyStatus::Dependent)));
        assert!(!r.matches(CareSetting::Ward, None));
    }

    #[test]
    fn test_plan_rule_with_dependency_requires_it() {
        let r = rule(CareSetting::Ward, Some(DependencyStatus::Dependent));
        assert!(r.matches(CareSetting::Ward, Some(DependencyStatus::Dependent)));
        assert!(!r.matches(CareSetting::Ward, Some(DependencyStatus::Independent)));
        assert!(!r.matches(CareSetting::Ward, None));
    }
}
