//! Equipment eligibility and auto-selection engine.
//!
//! # Architecture
//!
//! - **Configuration**: catalog and rules table, loaded once at startup (or
//!   embedded defaults) and cross-checked before the engine is built
//! - **Planner**: encounter context -> required / optional categories
//! - **Eligibility**: category + context -> lazily filtered catalog items
//! - **Resolver**: selection hooks deriving the default mattress and the
//!   pump / air supply a mat or hoist-lift sling needs
//! - **Advisories**: notes for the plan and warnings for empty categories
//!
//! The engine is immutable; per-encounter state lives in a
//! [`Session`](crate::session::Session).
//!
//! # Example
//!
//! ```ignore
//! use bariatric_equipment::{Category, DependencyStatus, Engine, PatientWeight, Session};
//!
//! let engine = Engine::with_defaults()?;
//! let mut session = Session::new(&engine);
//!
//! session.set_location("F06033-K")?;
//! session.set_ward_name("Ward 7")?;
//! session.propose_weight(PatientWeight::Exact(320))?;
//! session.set_dependency(DependencyStatus::Dependent);
//! session.select(Category::Bed, "Heavy-Duty Bed")?;
//!
//! assert_eq!(
//!     session.selections().get(&Category::Mattress).map(String::as_str),
//!     Some("Heavy-Duty Foam Mattress"),
//! );
//! ```

pub mod advisory;
pub mod eligibility;
pub mod planner;
pub mod resolver;

pub use advisory::{Advisory, AdvisoryKind};
pub use eligibility::EligibleItems;
pub use planner::CategoryPlan;
pub use resolver::{default_hooks, DefaultMattressRule, SupportAccessoryRule};

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{default_catalog, load_catalog, Catalog, Category};
use crate::config::ConfigPaths;
use crate::encounter::EncounterContext;
use crate::error::{EquipmentError, EquipmentResult};
use crate::rules::{default_rules, load_rules, RulesConfig};
use crate::selection::{RuleEnv, SelectionState};

/// Validated catalog and rules, shared read-only by every session.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Catalog,
    rules: RulesConfig,
}

impl Engine {
    /// Build an engine, failing fast when the rules and catalog disagree.
    pub fn new(catalog: Catalog, rules: RulesConfig) -> EquipmentResult<Self> {
        let issues = rules.validate(&catalog);
        if !issues.is_empty() {
            return Err(EquipmentError::InconsistentConfig(
                issues.iter().map(|i| i.to_string()).collect(),
            ));
        }
        Ok(Self { catalog, rules })
    }

    /// Engine built from the embedded catalog and rules.
    pub fn with_defaults() -> EquipmentResult<Self> {
        Self::new(default_catalog(), default_rules())
    }

    /// Load the engine, using override files where present.
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let catalog = match &paths.catalog {
            Some(path) => load_catalog(path)?,
            None => default_catalog(),
        };
        let rules = match &paths.rules {
            Some(path) => load_rules(path)?,
            None => default_rules(),
        };

        let engine = Self::new(catalog, rules).context("Catalog and rules are inconsistent")?;
        info!(
            "Engine ready: {} items, {} locations",
            engine.catalog.len(),
            engine.rules.locations.len()
        );
        Ok(engine)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Everything selection hooks consult for `context`.
    pub fn env<'a>(&'a self, context: &'a EncounterContext) -> RuleEnv<'a> {
        RuleEnv {
            catalog: &self.catalog,
            rules: &self.rules,
            context,
        }
    }

    pub fn plan(&self, context: &EncounterContext, selections: &SelectionState) -> CategoryPlan {
        planner::plan(&self.rules, context, selections)
    }

    pub fn eligible<'a>(
        &'a self,
        category: Category,
        context: &'a EncounterContext,
        selections: &'a SelectionState,
    ) -> EligibleItems<'a> {
        eligibility::eligible(&self.catalog, &self.rules, category, context, selections)
    }

    pub fn advisories(
        &self,
        context: &EncounterContext,
        selections: &SelectionState,
        plan: &CategoryPlan,
    ) -> Vec<Advisory> {
        advisory::advisories(&self.catalog, &self.rules, context, selections, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog;

    #[test]
    fn test_defaults_are_consistent() {
        let engine = Engine::with_defaults().expect("Embedded config should be consistent");
        assert_eq!(engine.rules().locations.len(), 4);
        assert!(!engine.catalog().is_empty());
    }

    #[test]
    fn test_unknown_location_in_catalog_rejected() {
        let catalog = parse_catalog(
            r#"
[[items]]
name = "Bariatric Bed"
category = "Bed"
location = ["NOWHERE"]
max_load = 250
"#,
        )
        .unwrap();

        let err = Engine::new(catalog, default_rules()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown location code 'NOWHERE'"), "got: {}", msg);
    }

    #[test]
    fn test_load_without_overrides_uses_defaults() {
        let engine = Engine::load(&ConfigPaths::default()).unwrap();
        assert_eq!(engine.catalog().len(), default_catalog().len());
    }
}
