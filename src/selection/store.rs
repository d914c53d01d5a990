use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::types::*;
use crate::catalog::Category;

/// Upper bound on hook passes per mutation. Well-behaved hooks settle in two.
const MAX_HOOK_PASSES: usize = 8;

/// Holds the category -> item selection for one encounter and runs the
/// registered hooks after every mutation.
///
/// Single owner only: the store is not meant to be shared between writers.
pub struct SelectionStore {
    state: SelectionState,
    derived: BTreeSet<Category>,
    hooks: Vec<Box<dyn SelectionHook>>,
}

impl SelectionStore {
    /// A store with no hooks.
    pub fn new() -> Self {
        Self::with_hooks(Vec::new())
    }

    pub fn with_hooks(hooks: Vec<Box<dyn SelectionHook>>) -> Self {
        Self {
            state: SelectionState::new(),
            derived: BTreeSet::new(),
            hooks,
        }
    }

    pub fn get(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self, category: Category) -> Option<&str> {
        self.state.get(&category).map(|s| s.as_str())
    }

    pub fn is_derived(&self, category: Category) -> bool {
        self.derived.contains(&category)
    }

    /// Merge a user change into the state, then run hooks to a fixpoint.
    ///
    /// Every key in `partial` becomes user-owned: it loses any derived mark,
    /// so later retractions leave it alone.
    pub fn set(&mut self, partial: SelectionPatch, env: &RuleEnv<'_>) -> &SelectionState {
        for (category, value) in partial {
            self.derived.remove(&category);
            match value {
                Some(name) => {
                    if self.state.get(&category) != Some(&name) {
                        debug!("Selected {} = {}", category, name);
                        self.state.insert(category, name);
                    }
                }
                None => {
                    if let Some(old) = self.state.remove(&category) {
                        debug!("Cleared {} (was {})", category, old);
                    }
                }
            }
        }

        self.run_hooks(env);
        &self.state
    }

    /// Re-run hooks without a selection change, e.g. after the patient's
    /// weight or location changed. Returns the number of writes committed.
    pub fn reconcile(&mut self, env: &RuleEnv<'_>) -> usize {
        self.run_hooks(env)
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        self.state.clear();
        self.derived.clear();
    }

    fn run_hooks(&mut self, env: &RuleEnv<'_>) -> usize {
        let mut total = 0;

        for pass in 0..MAX_HOOK_PASSES {
            let mut changed = 0;

            for idx in 0..self.hooks.len() {
                let derivations = {
                    let view = SelectionView {
                        state: &self.state,
                        derived: &self.derived,
                    };
                    self.hooks[idx].derive(&view, env)
                };
                let hook = self.hooks[idx].name();
                for derivation in derivations {
                    if self.commit(hook, derivation) {
                        changed += 1;
                    }
                }
            }

            total += changed;
            if changed == 0 {
                debug!("Hooks settled after {} pass(es), {} write(s)", pass + 1, total);
                return total;
            }
        }

        warn!(
            "Selection hooks did not settle after {} passes; keeping last state",
            MAX_HOOK_PASSES
        );
        total
    }

    /// Apply one derived write if it changes the state.
    fn commit(&mut self, hook: &str, derivation: Derivation) -> bool {
        match derivation {
            Derivation::Set(category, name) => {
                if self.state.get(&category) == Some(&name) {
                    return false;
                }
                info!("{}: auto-selected {} = {}", hook, category, name);
                self.state.insert(category, name);
                self.derived.insert(category);
                true
            }
            Derivation::Clear(category) => match self.state.remove(&category) {
                Some(old) => {
                    info!("{}: cleared {} (was {})", hook, category, old);
                    self.derived.remove(&category);
                    true
                }
                None => false,
            },
        }
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}
