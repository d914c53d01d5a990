//! Auto-selection rules, run by the selection store after every mutation.
//!
//! - [`DefaultMattressRule`]: a chosen bed brings its default mattress
//! - [`SupportAccessoryRule`]: a chosen mat or hoist-lift sling brings the
//!   pump / air supply it needs
//!
//! Both rules look only at the current state, so running them again on a
//! settled state yields no writes.

use crate::catalog::Category;
use crate::encounter::EncounterContext;
use crate::rules::RulesConfig;
use crate::selection::{Derivation, RuleEnv, SelectionHook, SelectionState, SelectionView};

/// The rules every session store runs, in order.
pub fn default_hooks() -> Vec<Box<dyn SelectionHook>> {
    vec![Box::new(DefaultMattressRule), Box::new(SupportAccessoryRule)]
}

/// The accessory the current selection calls for, if any.
///
/// The hoist-lift sling takes priority over a mat. A mat needs the weight to
/// pick between single and dual air supply; without a weight nothing is
/// derived.
pub fn derived_accessory<'r>(
    rules: &'r RulesConfig,
    context: &EncounterContext,
    selections: &SelectionState,
) -> Option<&'r str> {
    let acc = &rules.accessories;

    if selections.get(&Category::Slings) == Some(&acc.hoist_lift_sling) {
        return Some(acc.sling_pump.as_str());
    }

    if selections.contains_key(&Category::Mat) {
        let weight = context.effective_weight()?;
        let supply = if weight >= acc.dual_air_supply_threshold_kg {
            acc.dual_air_supply.as_str()
        } else {
            acc.single_air_supply.as_str()
        };
        return Some(supply);
    }

    None
}

/// Keeps Mattress consistent with Bed.
pub struct DefaultMattressRule;

impl SelectionHook for DefaultMattressRule {
    fn name(&self) -> &'static str {
        "default-mattress"
    }

    fn derive(&self, view: &SelectionView<'_>, env: &RuleEnv<'_>) -> Vec<Derivation> {
        let mattress = view.selected(Category::Mattress);

        let Some(bed) = view.selected(Category::Bed) else {
            // Only retract what we put there; a hand-picked mattress stays.
            if mattress.is_some() && view.is_derived(Category::Mattress) {
                return vec![Derivation::Clear(Category::Mattress)];
            }
            return vec![];
        };

        let fits = mattress
            .and_then(|name| env.catalog.find(name))
            .is_some_and(|m| m.fits_bed(bed));
        if fits {
            return vec![];
        }

        match env.catalog.default_mattress_for(bed) {
            Some(default) => vec![Derivation::Set(Category::Mattress, default.name.clone())],
            // An incompatible mattress cannot stay next to this bed.
            None if mattress.is_some() => vec![Derivation::Clear(Category::Mattress)],
            None => vec![],
        }
    }
}

/// Keeps Accessories holding exactly the derived pump / air supply, and
/// keeps the hoist-lift sling and a mat from being selected together.
pub struct SupportAccessoryRule;

impl SelectionHook for SupportAccessoryRule {
    fn name(&self) -> &'static str {
        "support-accessory"
    }

    fn derive(&self, view: &SelectionView<'_>, env: &RuleEnv<'_>) -> Vec<Derivation> {
        let acc = &env.rules.accessories;
        let mut out = Vec::new();

        let lift_sling = view.selected(Category::Slings) == Some(acc.hoist_lift_sling.as_str());
        if lift_sling && view.selected(Category::Mat).is_some() {
            out.push(Derivation::Clear(Category::Mat));
        }

        let current = view.selected(Category::Accessories);
        match derived_accessory(env.rules, env.context, view.state()) {
            Some(wanted) if current != Some(wanted) => {
                out.push(Derivation::Set(Category::Accessories, wanted.to_string()));
            }
            Some(_) => {}
            None => {
                let held_rule_value = current.is_some_and(|name| {
                    [&acc.sling_pump, &acc.single_air_supply, &acc.dual_air_supply]
                        .iter()
                        .any(|a| a.as_str() == name)
                });
                if held_rule_value || (current.is_some() && view.is_derived(Category::Accessories)) {
                    out.push(Derivation::Clear(Category::Accessories));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_catalog, Catalog};
    use crate::encounter::{DependencyStatus, PatientWeight};
    use crate::rules::default_rules;
    use crate::selection::{SelectionPatch, SelectionStore};

    struct Fixture {
        catalog: Catalog,
        rules: RulesConfig,
        context: EncounterContext,
        store: SelectionStore,
    }

    impl Fixture {
        fn ward(weight_kg: u32) -> Self {
            let mut context = EncounterContext::new();
            context.location = Some("F06033-K".to_string());
            context.patient_weight = Some(PatientWeight::Exact(weight_kg));
            context.dependency_status = Some(DependencyStatus::Dependent);
            Self {
                catalog: default_catalog(),
                rules: default_rules(),
                context,
                store: SelectionStore::with_hooks(default_hooks()),
            }
        }

        fn set(&mut self, category: Category, value: Option<&str>) {
            let env = RuleEnv {
                catalog: &self.catalog,
                rules: &self.rules,
                context: &self.context,
            };
            let patch = SelectionPatch::from([(category, value.map(|v| v.to_string()))]);
            self.store.set(patch, &env);
        }

        fn reconcile(&mut self) -> usize {
            let env = RuleEnv {
                catalog: &self.catalog,
                rules: &self.rules,
                context: &self.context,
            };
            self.store.reconcile(&env)
        }

        fn get(&self, category: Category) -> Option<&str> {
            self.store.selected(category)
        }
    }

    #[test]
    fn test_bed_selects_default_mattress() {
        let mut f = Fixture::ward(320);
        f.set(Category::Bed, Some("Heavy-Duty Bed"));
        assert_eq!(f.get(Category::Mattress), Some("Heavy-Duty Foam Mattress"));
        assert!(f.store.is_derived(Category::Mattress));
    }

    #[test]
    fn test_compatible_mattress_kept_on_bed_change() {
        let mut f = Fixture::ward(320);
        f.set(Category::Bed, Some("Heavy-Duty Bed"));
        f.set(Category::Mattress, Some("Extra-Wide Air Mattress"));
        f.set(Category::Bed, Some("Extra-Wide Bariatric Bed"));
        assert_eq!(
            f.get(Category::Mattress),
            Some("Extra-Wide Air Mattress"),
            "Mattress compatible with the new bed should stay"
        );
    }

    #[test]
    fn test_incompatible_mattress_replaced_on_bed_change() {
        let mut f = Fixture::ward(240);
        f.set(Category::Bed, Some("Heavy-Duty Bed"));
        f.set(Category::Mattress, Some("Heavy-Duty Air Mattress"));
        f.set(Category::Bed, Some("Bariatric Bed"));
        assert_eq!(f.get(Category::Mattress), Some("Bariatric Foam Mattress"));
    }

    #[test]
    fn test_deselecting_bed_clears_derived_mattress() {
        let mut f = Fixture::ward(320);
        f.set(Category::Bed, Some("Heavy-Duty Bed"));
        f.set(Category::Bed, None);
        assert_eq!(f.get(Category::Mattress), None);
    }

    #[test]
    fn test_deselecting_bed_keeps_manual_mattress() {
        let mut f = Fixture::ward(320);
        f.set(Category::Bed, Some("Heavy-Duty Bed"));
        f.set(Category::Mattress, Some("Heavy-Duty Air Mattress"));
        f.set(Category::Bed, None);
        assert_eq!(f.get(Category::Mattress), Some("Heavy-Duty Air Mattress"));
    }

    #[test]
    fn test_mat_below_threshold_gets_single_air_supply() {
        let mut f = Fixture::ward(320);
        f.set(Category::Mat, Some("Hovermat"));
        assert_eq!(f.get(Category::Accessories), Some("Air Supply for Hovermat"));
    }

    #[test]
    fn test_mat_at_threshold_gets_dual_air_supply() {
        let mut f = Fixture::ward(350);
        f.set(Category::Mat, Some("Hovermat"));
        assert_eq!(f.get(Category::Accessories), Some("2x Air Supply for Hovermat"));
    }

    #[test]
    fn test_weight_change_retiers_air_supply() {
        let mut f = Fixture::ward(320);
        f.set(Category::Mat, Some("Hovermat"));
        f.context.patient_weight = Some(PatientWeight::Exact(400));
        assert_eq!(f.reconcile(), 1);
        assert_eq!(f.get(Category::Accessories), Some("2x Air Supply for Hovermat"));
    }

    #[test]
    fn test_hoversling_replaces_mat_and_takes_dual_pumps() {
        let mut f = Fixture::ward(200);
        f.set(Category::Mat, Some("Hovermat"));
        f.set(Category::Slings, Some("Hoversling"));
        assert_eq!(f.get(Category::Mat), None, "Hovermat should be cleared");
        assert_eq!(f.get(Category::Accessories), Some("2x Hovertech Pumps"));
    }

    #[test]
    fn test_removing_trigger_clears_accessory() {
        let mut f = Fixture::ward(320);
        f.set(Category::Mat, Some("Hovermat"));
        f.set(Category::Mat, None);
        assert_eq!(f.get(Category::Accessories), None);

        f.set(Category::Slings, Some("Hoversling"));
        f.set(Category::Slings, Some("Full-Body Sling (XXL)"));
        assert_eq!(f.get(Category::Accessories), None);
    }

    #[test]
    fn test_user_held_rule_accessory_still_retracted() {
        let mut f = Fixture::ward(320);
        f.set(Category::Mat, Some("Hovermat"));
        // The user re-confirms the derived value, taking ownership of it.
        f.set(Category::Accessories, Some("Air Supply for Hovermat"));
        f.set(Category::Mat, None);
        assert_eq!(f.get(Category::Accessories), None);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let mut f = Fixture::ward(320);
        f.set(Category::Bed, Some("Heavy-Duty Bed"));
        f.set(Category::Slings, Some("Hoversling"));
        let settled = f.store.get().clone();
        assert_eq!(f.reconcile(), 0);
        assert_eq!(f.reconcile(), 0);
        assert_eq!(f.store.get(), &settled);
    }

    #[test]
    fn test_derived_accessory_without_weight_is_none() {
        let rules = default_rules();
        let context = EncounterContext::new();
        let selections = SelectionState::from([(Category::Mat, "Hovermat".to_string())]);
        assert_eq!(derived_accessory(&rules, &context, &selections), None);
    }
}
