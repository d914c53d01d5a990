//! Eligibility filter: which catalog items a patient may be given for a
//! category at their location.

use std::slice;

use crate::catalog::{Catalog, Category, EquipmentItem};
use crate::encounter::EncounterContext;
use crate::rules::RulesConfig;
use crate::selection::SelectionState;

use super::resolver::derived_accessory;

/// Lazy iterator over the eligible items of one category.
///
/// Nothing is cached: each call to [`eligible`] re-evaluates against the
/// context and selections it is given, and the iterator can be cloned to
/// walk the same result again.
#[derive(Clone)]
pub struct EligibleItems<'a> {
    items: slice::Iter<'a, EquipmentItem>,
    category: Category,
    location: Option<&'a str>,
    weight_kg: Option<u32>,
    bed: Option<&'a str>,
    accessory: Option<&'a str>,
}

impl<'a> Iterator for EligibleItems<'a> {
    type Item = &'a EquipmentItem;

    fn next(&mut self) -> Option<Self::Item> {
        let location = self.location?;
        let weight_kg = self.weight_kg?;

        self.items.by_ref().find(|item| {
            if item.category != self.category || !item.is_at(location) {
                return false;
            }
            if !item.supports_weight(weight_kg) {
                return false;
            }
            match self.category {
                Category::Mattress => self.bed.map_or(true, |bed| item.fits_bed(bed)),
                Category::Accessories => self.accessory == Some(item.name.as_str()),
                _ => true,
            }
        })
    }
}

/// Items of `category` a patient in `context` may use, given the current
/// selections.
///
/// Yields nothing until both location and weight are known. Mattress
/// choices narrow to the selected bed; Accessories only ever offers the
/// accessory derived from the current selection.
pub fn eligible<'a>(
    catalog: &'a Catalog,
    rules: &'a RulesConfig,
    category: Category,
    context: &'a EncounterContext,
    selections: &'a SelectionState,
) -> EligibleItems<'a> {
    let accessory = match category {
        Category::Accessories => derived_accessory(rules, context, selections),
        _ => None,
    };

    EligibleItems {
        items: catalog.items().iter(),
        category,
        location: context.location.as_deref(),
        weight_kg: context.effective_weight(),
        bed: selections.get(&Category::Bed).map(|b| b.as_str()),
        accessory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::encounter::PatientWeight;
    use crate::rules::default_rules;

    const WELLINGTON_WARD: &str = "F06033-K";
    const HUTT_ED: &str = "F3S638-G";

    fn context(location: &str, weight: PatientWeight) -> EncounterContext {
        let mut ctx = EncounterContext::new();
        ctx.location = Some(location.to_string());
        ctx.patient_weight = Some(weight);
        ctx
    }

    fn names<'a>(items: impl Iterator<Item = &'a EquipmentItem>) -> Vec<&'a str> {
        items.map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_filters_by_weight() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(320));
        let sel = SelectionState::new();

        let beds = names(eligible(&catalog, &rules, Category::Bed, &ctx, &sel));
        assert_eq!(beds, vec!["Heavy-Duty Bed", "Extra-Wide Bariatric Bed"]);
    }

    #[test]
    fn test_min_load_excludes_light_patients() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(200));
        let sel = SelectionState::new();

        let beds = names(eligible(&catalog, &rules, Category::Bed, &ctx, &sel));
        assert!(!beds.contains(&"Extra-Wide Bariatric Bed"));
        assert!(beds.contains(&"Bariatric Bed"));
    }

    #[test]
    fn test_filters_by_location() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(HUTT_ED, PatientWeight::Band { min: 180, max: Some(250) });
        let sel = SelectionState::new();

        let hoists = names(eligible(&catalog, &rules, Category::Hoist, &ctx, &sel));
        assert!(hoists.is_empty(), "No hoists are stocked in ED, got {:?}", hoists);
    }

    #[test]
    fn test_band_uses_upper_bound() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(HUTT_ED, PatientWeight::Band { min: 180, max: Some(250) });
        let sel = SelectionState::new();

        // Checked at 250kg, exactly the Bariatric Bed limit.
        let beds = names(eligible(&catalog, &rules, Category::Bed, &ctx, &sel));
        assert!(beds.contains(&"Bariatric Bed"));

        let ctx = context(HUTT_ED, PatientWeight::Band { min: 250, max: Some(350) });
        let beds = names(eligible(&catalog, &rules, Category::Bed, &ctx, &sel));
        assert!(!beds.contains(&"Bariatric Bed"));
    }

    #[test]
    fn test_never_exceeds_max_load() {
        let catalog = default_catalog();
        let rules = default_rules();
        let sel = SelectionState::new();

        for weight in [150, 250, 251, 320, 454, 455, 544, 700] {
            let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(weight));
            for category in Category::ALL {
                for item in eligible(&catalog, &rules, category, &ctx, &sel) {
                    if let Some(max) = item.effective_max_load() {
                        assert!(
                            max >= weight,
                            "{} (SWL {}kg) offered for {}kg",
                            item.name,
                            max,
                            weight
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_mattress_narrows_to_selected_bed() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(320));

        let none = SelectionState::new();
        let all = names(eligible(&catalog, &rules, Category::Mattress, &ctx, &none));
        assert_eq!(all.len(), 3);

        let sel = SelectionState::from([(Category::Bed, "Extra-Wide Bariatric Bed".to_string())]);
        let narrowed = names(eligible(&catalog, &rules, Category::Mattress, &ctx, &sel));
        assert_eq!(narrowed, vec!["Extra-Wide Air Mattress"]);
    }

    #[test]
    fn test_accessories_only_offer_derived_item() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(200));

        let none = SelectionState::new();
        assert_eq!(
            eligible(&catalog, &rules, Category::Accessories, &ctx, &none).count(),
            0,
            "Accessories are not browsable without a trigger"
        );

        let sel = SelectionState::from([(Category::Mat, "Hovermat".to_string())]);
        let offered = names(eligible(&catalog, &rules, Category::Accessories, &ctx, &sel));
        assert_eq!(offered, vec!["Air Supply for Hovermat"]);
    }

    #[test]
    fn test_unknown_weight_yields_nothing() {
        let catalog = default_catalog();
        let rules = default_rules();
        let mut ctx = EncounterContext::new();
        ctx.location = Some(WELLINGTON_WARD.to_string());
        let sel = SelectionState::new();
        assert_eq!(eligible(&catalog, &rules, Category::Bed, &ctx, &sel).count(), 0);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(320));
        let sel = SelectionState::new();

        let items = eligible(&catalog, &rules, Category::Wheelchairs, &ctx, &sel);
        let first = names(items.clone());
        let second = names(items);
        assert_eq!(first, second);
        assert_eq!(first, vec!["Heavy-Duty Wheelchair"]);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let catalog = default_catalog();
        let rules = default_rules();
        let ctx = context(WELLINGTON_WARD, PatientWeight::Exact(600));
        let sel = SelectionState::new();
        assert_eq!(eligible(&catalog, &rules, Category::Bed, &ctx, &sel).count(), 0);
    }
}
