//! Declarative encounter rules: locations, category plans, weight bands,
//! site alerts, advisories and the accessory derivation constants.
//!
//! The planner, eligibility filter and resolver read all of their constants
//! from a [`RulesConfig`]; none of them hard-code thresholds or category
//! lists.

mod loader;
mod types;

pub use loader::{default_rules, load_rules, parse_rules};
pub use types::*;

use std::collections::HashSet;

use crate::catalog::{Catalog, Category, ConfigIssue};

impl RulesConfig {
    pub fn location(&self, code: &str) -> Option<&LocationDef> {
        self.locations.iter().find(|l| l.code == code)
    }

    pub fn sites(&self) -> impl Iterator<Item = &str> + '_ {
        let mut seen = HashSet::new();
        self.locations
            .iter()
            .map(|l| l.site.as_str())
            .filter(move |s| seen.insert(*s))
    }

    /// Check the rules against themselves and against the catalog they will
    /// be used with.
    pub fn validate(&self, catalog: &Catalog) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let mut codes = HashSet::new();
        for loc in &self.locations {
            if !codes.insert(loc.code.as_str()) {
                issues.push(ConfigIssue::new(&loc.code, "duplicate location code"));
            }
        }
        let sites: HashSet<&str> = self.sites().collect();

        for item in catalog.items() {
            for code in &item.location {
                if !codes.contains(code.as_str()) {
                    issues.push(ConfigIssue::new(
                        &item.name,
                        format!("unknown location code '{}'", code),
                    ));
                }
            }
            for site in item.procurement.keys() {
                if !sites.contains(site.as_str()) {
                    issues.push(ConfigIssue::new(
                        &item.name,
                        format!("procurement entry for unknown site '{}'", site),
                    ));
                }
            }
        }

        let acc = &self.accessories;
        let expectations = [
            (&acc.hoist_lift_sling, Category::Slings),
            (&acc.sling_pump, Category::Accessories),
            (&acc.single_air_supply, Category::Accessories),
            (&acc.dual_air_supply, Category::Accessories),
        ];
        for (name, category) in expectations {
            match catalog.find(name) {
                None => issues.push(ConfigIssue::new(
                    "accessories",
                    format!("'{}' is not in the catalog", name),
                )),
                Some(item) if item.category != category => issues.push(ConfigIssue::new(
                    "accessories",
                    format!("'{}' must be a {} item, found {}", name, category, item.category),
                )),
                Some(_) => {}
            }
        }

        for (idx, plan) in self.plans.iter().enumerate() {
            let subject = format!("plans[{}]", idx);
            if plan.required.contains(&Category::Accessories)
                || plan.optional.contains(&Category::Accessories)
            {
                issues.push(ConfigIssue::new(
                    &subject,
                    "Accessories is added by the planner when a trigger is selected and cannot be listed",
                ));
            }
            if let Some(dup) = plan.required.iter().find(|c| plan.optional.contains(c)) {
                issues.push(ConfigIssue::new(
                    &subject,
                    format!("{} is listed as both required and optional", dup),
                ));
            }
        }

        for band in &self.weight_bands {
            if let Some(max) = band.max_kg {
                if max < band.min_kg {
                    issues.push(ConfigIssue::new(
                        &band.label,
                        format!("band maximum {}kg is below minimum {}kg", max, band.min_kg),
                    ));
                }
            }
        }

        issues
    }
}
