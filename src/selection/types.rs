use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Catalog, Category};
use crate::encounter::EncounterContext;
use crate::rules::RulesConfig;

/// Current selection: category -> selected item name.
pub type SelectionState = BTreeMap<Category, String>;

/// Partial update merged into the state. `None` removes the entry.
pub type SelectionPatch = BTreeMap<Category, Option<String>>;

/// A write requested by a rule hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    Set(Category, String),
    Clear(Category),
}

/// Read-only view of the store handed to hooks.
pub struct SelectionView<'a> {
    pub(crate) state: &'a SelectionState,
    pub(crate) derived: &'a BTreeSet<Category>,
}

impl<'a> SelectionView<'a> {
    pub fn selected(&self, category: Category) -> Option<&'a str> {
        self.state.get(&category).map(|s| s.as_str())
    }

    /// True when the entry was written by a hook rather than by the user.
    pub fn is_derived(&self, category: Category) -> bool {
        self.derived.contains(&category)
    }

    pub fn state(&self) -> &'a SelectionState {
        self.state
    }
}

/// Everything a hook may consult besides the selection itself.
#[derive(Clone, Copy)]
pub struct RuleEnv<'a> {
    pub catalog: &'a Catalog,
    pub rules: &'a RulesConfig,
    pub context: &'a EncounterContext,
}

/// A rule run by the store after every mutation.
///
/// Hooks never write to the store directly; they return the writes they
/// want and the store commits those that change something. Returning a
/// write that is already satisfied must be harmless.
pub trait SelectionHook {
    fn name(&self) -> &'static str;

    fn derive(&self, view: &SelectionView<'_>, env: &RuleEnv<'_>) -> Vec<Derivation>;
}
