//! Advisories shown alongside a plan: static notes from the rules table plus
//! one warning per planned category that nothing is eligible for.

use serde::Serialize;

use crate::catalog::{Catalog, Category};
use crate::encounter::EncounterContext;
use crate::rules::{AdvisoryRule, RulesConfig};
use crate::selection::SelectionState;

use super::eligibility::eligible;
use super::planner::CategoryPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// Informational note from the rules table
    Notice,
    /// A planned category has no eligible items; the flow cannot complete
    NoEquipment,
}

/// A message for the user, optionally attached to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub category: Option<Category>,
    pub kind: AdvisoryKind,
    pub message: String,
}

fn applies(
    rule: &AdvisoryRule,
    rules: &RulesConfig,
    context: &EncounterContext,
    plan: &CategoryPlan,
) -> bool {
    if let Some(setting) = rule.setting {
        let here = context
            .location
            .as_deref()
            .and_then(|code| rules.location(code))
            .map(|l| l.setting);
        if here != Some(setting) {
            return false;
        }
    }
    if let Some(category) = rule.category {
        if !plan.contains(category) {
            return false;
        }
    }
    if let Some(dependency) = rule.dependency {
        if context.dependency_status != Some(dependency) {
            return false;
        }
    }
    true
}

fn no_equipment_message(category: Category) -> String {
    format!(
        "No available {} under the patient's weight limit. Please get in contact with moving and handling specialist.",
        category.as_str().to_lowercase()
    )
}

/// Advisories for a plan, rules-table notes first, then one
/// [`AdvisoryKind::NoEquipment`] entry per planned category with no eligible
/// items, in plan order.
pub fn advisories(
    catalog: &Catalog,
    rules: &RulesConfig,
    context: &EncounterContext,
    selections: &SelectionState,
    plan: &CategoryPlan,
) -> Vec<Advisory> {
    if !plan.is_ready() {
        return Vec::new();
    }

    let mut out: Vec<Advisory> = rules
        .advisories
        .iter()
        .filter(|rule| applies(rule, rules, context, plan))
        .map(|rule| Advisory {
            category: rule.category,
            kind: AdvisoryKind::Notice,
            message: rule.message.clone(),
        })
        .collect();

    for category in plan.categories() {
        let mut items = eligible(catalog, rules, category, context, selections);
        if items.next().is_none() {
            out.push(Advisory {
                category: Some(category),
                kind: AdvisoryKind::NoEquipment,
                message: no_equipment_message(category),
            });
        }
    }

    out
}
