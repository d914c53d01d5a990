//! TOML loading for the rules table.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use super::types::RulesConfig;

/// Default rules embedded in the binary, from `config/rules.toml`.
const DEFAULT_RULES: &str = include_str!("../../config/rules.toml");

pub fn parse_rules(content: &str) -> Result<RulesConfig> {
    let rules: RulesConfig = toml::from_str(content).context("Rules TOML is malformed")?;
    Ok(rules)
}

/// Load rules from a TOML file at the given path.
///
/// Cross-checks against the catalog happen when the engine is built, since
/// the rules file alone cannot tell whether the names it uses exist.
pub fn load_rules(path: &Path) -> Result<RulesConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    let rules =
        parse_rules(&content).with_context(|| format!("Invalid rules in {}", path.display()))?;
    info!(
        "Loaded {} locations and {} plans from {:?}",
        rules.locations.len(),
        rules.plans.len(),
        path
    );
    Ok(rules)
}

/// Get the rules embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_rules() -> RulesConfig {
    parse_rules(DEFAULT_RULES).expect("embedded rules.toml must be valid TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::encounter::{CareSetting, DependencyStatus};

    #[test]
    fn test_default_rules_loads() {
        let rules = default_rules();
        assert_eq!(rules.locations.len(), 4, "Should have the four canonical locations");
        assert_eq!(rules.plans.len(), 3);
        assert_eq!(rules.weight_bands.len(), 3);
    }

    #[test]
    fn test_default_threshold_is_single_constant() {
        let rules = default_rules();
        assert_eq!(rules.accessories.dual_air_supply_threshold_kg, 350);
    }

    #[test]
    fn test_ed_alert_thresholds() {
        let rules = default_rules();
        let hutt = rules.location("F3S638-G").unwrap();
        assert_eq!(hutt.alert.as_ref().map(|a| a.threshold_kg), Some(200));
        let wellington = rules.location("F3M163-E").unwrap();
        assert_eq!(wellington.alert.as_ref().map(|a| a.threshold_kg), Some(400));
        assert!(rules.location("F06033-K").unwrap().alert.is_none());
    }

    #[test]
    fn test_dependent_plan_requires_hoist_and_slings() {
        let rules = default_rules();
        let plan = rules
            .plans
            .iter()
            .find(|p| p.matches(CareSetting::Ward, Some(DependencyStatus::Dependent)))
            .unwrap();
        assert!(plan.required.contains(&Category::Hoist));
        assert!(plan.required.contains(&Category::Slings));
    }

    #[test]
    fn test_top_band_is_open_ended() {
        let rules = default_rules();
        let last = rules.weight_bands.last().unwrap();
        assert_eq!(last.min_kg, 350);
        assert_eq!(last.max_kg, None);
    }

    #[test]
    fn test_missing_accessories_section_fails() {
        let toml = r#"
            [[locations]]
            code = "X"
            label = "X"
            site = "X"
            setting = "ward"

            [[plans]]
            setting = "ward"
            required = ["Bed"]
        "#;
        assert!(parse_rules(toml).is_err());
    }
}
