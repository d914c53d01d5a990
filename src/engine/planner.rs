//! Category planner: which categories an encounter must and may fill.

use serde::Serialize;
use tracing::debug;

use crate::catalog::Category;
use crate::encounter::{CareSetting, EncounterContext};
use crate::rules::RulesConfig;
use crate::selection::SelectionState;

/// Ordered required and optional categories for an encounter.
///
/// An empty plan means the context is not complete enough to plan yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryPlan {
    pub required: Vec<Category>,
    pub optional: Vec<Category>,
}

impl CategoryPlan {
    pub fn is_ready(&self) -> bool {
        !self.required.is_empty() || !self.optional.is_empty()
    }

    /// Required categories first, then optional.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.required.iter().chain(self.optional.iter()).copied()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.required.contains(&category) || self.optional.contains(&category)
    }

    pub fn is_optional(&self, category: Category) -> bool {
        self.optional.contains(&category)
    }
}

pub fn plan(
    rules: &RulesConfig,
    context: &EncounterContext,
    selections: &SelectionState,
) -> CategoryPlan {
    let Some(code) = context.location.as_deref() else {
        return CategoryPlan::default();
    };
    let Some(location) = rules.location(code) else {
        debug!("No plan: unknown location {}", code);
        return CategoryPlan::default();
    };

    // Wards cannot be planned until dependency status is known.
    let dependency = match location.setting {
        CareSetting::Ward => match context.dependency_status {
            Some(status) => Some(status),
            None => return CategoryPlan::default(),
        },
        CareSetting::Emergency => None,
    };

    let Some(rule) = rules
        .plans
        .iter()
        .find(|p| p.matches(location.setting, dependency))
    else {
        debug!("No plan row for {:?} / {:?}", location.setting, dependency);
        return CategoryPlan::default();
    };

    let mut required = rule.required.clone();
    let optional = rule.optional.clone();

    let lift_sling = selections
        .get(&Category::Slings)
        .is_some_and(|s| *s == rules.accessories.hoist_lift_sling);

    // The hoist-lift sling is itself the transfer surface.
    if lift_sling {
        required.retain(|c| *c != Category::Mat);
    }

    // Accessories only ever hosts the derived pump / air supply.
    if lift_sling || selections.contains_key(&Category::Mat) {
        required.push(Category::Accessories);
    }

    CategoryPlan { required, optional }
}
