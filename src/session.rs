//! One patient encounter: the collected context plus the selection store.
//!
//! A session borrows an immutable [`Engine`] and owns everything mutable.
//! Every context change re-runs the selection hooks so derived entries
//! (default mattress, air supply tier) always reflect the latest facts.

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Category;
use crate::encounter::intake::{parse_patient_id, parse_ward_name};
use crate::encounter::{
    check_weight_alert, CareSetting, DependencyStatus, EncounterContext, FieldError, PatientWeight,
};
use crate::engine::{default_hooks, Advisory, CategoryPlan, EligibleItems, Engine};
use crate::error::{EquipmentError, EquipmentResult};
use crate::rules::{LocationDef, WeightAlert};
use crate::selection::{SelectionPatch, SelectionState, SelectionStore};
use crate::summary::{build_summary, OrderSummary};

/// Outcome of proposing a weight.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightProposal {
    /// Stored; no alert applies
    Committed,
    /// Held back until [`Session::confirm_weight`] or
    /// [`Session::cancel_pending_weight`]
    NeedsConfirmation(WeightAlert),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Location,
    PatientId,
    Weight,
    Equipment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub step: Step,
    pub complete: bool,
}

pub struct Session<'e> {
    engine: &'e Engine,
    context: EncounterContext,
    store: SelectionStore,
    pending_weight: Option<PatientWeight>,
}

impl<'e> Session<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            context: EncounterContext::new(),
            store: SelectionStore::with_hooks(default_hooks()),
            pending_weight: None,
        }
    }

    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub fn context(&self) -> &EncounterContext {
        &self.context
    }

    pub fn selections(&self) -> &SelectionState {
        self.store.get()
    }

    pub fn is_derived(&self, category: Category) -> bool {
        self.store.is_derived(category)
    }

    pub fn pending_weight(&self) -> Option<PatientWeight> {
        self.pending_weight
    }

    /// The rules-table entry for the current location.
    pub fn location(&self) -> Option<&'e LocationDef> {
        let code = self.context.location.as_deref()?;
        self.engine.rules().location(code)
    }

    // ===== CONTEXT =====

    /// Choose the location.
    ///
    /// Moving between a ward and an ED clears weight and dependency status,
    /// since the two settings collect weight differently.
    pub fn set_location(&mut self, code: &str) -> EquipmentResult<()> {
        let location = self
            .engine
            .rules()
            .location(code)
            .ok_or_else(|| EquipmentError::UnknownLocation(code.to_string()))?;

        if self.context.location.as_deref() == Some(code) {
            return Ok(());
        }

        if let Some(previous) = self.location() {
            if previous.setting != location.setting {
                info!(
                    "Care setting changed to {:?}; clearing weight and dependency",
                    location.setting
                );
                self.context.patient_weight = None;
                self.context.dependency_status = None;
                self.pending_weight = None;
            }
        }

        self.context.location = Some(location.code.clone());
        self.context.secondary_location = match location.setting {
            CareSetting::Ward => Some(String::new()),
            CareSetting::Emergency => None,
        };
        info!("Location set to {} ({})", location.code, location.label);

        self.reconcile();
        Ok(())
    }

    pub fn set_ward_name(&mut self, raw: &str) -> Result<(), FieldError> {
        let name = parse_ward_name(raw)?;
        debug!("Ward name set to {}", name);
        self.context.secondary_location = Some(name);
        Ok(())
    }

    pub fn set_patient_id(&mut self, raw: &str) -> Result<(), FieldError> {
        let id = parse_patient_id(raw)?;
        debug!("Patient id set");
        self.context.patient_id = Some(id);
        Ok(())
    }

    /// Offer a weight for the current location.
    ///
    /// When it reaches the location's alert threshold the weight is held as
    /// pending and the alert is returned; nothing changes until it is
    /// confirmed.
    pub fn propose_weight(&mut self, weight: PatientWeight) -> EquipmentResult<WeightProposal> {
        let location = self.location().ok_or(EquipmentError::LocationNotSet)?;

        if let Some(alert) = check_weight_alert(location, &weight) {
            info!("Weight {} at {} needs confirmation", weight, location.code);
            self.pending_weight = Some(weight);
            return Ok(WeightProposal::NeedsConfirmation(alert.clone()));
        }

        self.commit_weight(weight);
        Ok(WeightProposal::Committed)
    }

    /// Store the pending weight after the user acknowledged the alert.
    pub fn confirm_weight(&mut self) -> EquipmentResult<PatientWeight> {
        let weight = self
            .pending_weight
            .take()
            .ok_or(EquipmentError::NoPendingWeight)?;
        self.commit_weight(weight);
        Ok(weight)
    }

    pub fn cancel_pending_weight(&mut self) {
        if let Some(weight) = self.pending_weight.take() {
            debug!("Discarded pending weight {}", weight);
        }
    }

    pub fn set_dependency(&mut self, status: DependencyStatus) {
        info!("Dependency status set to {}", status);
        self.context.dependency_status = Some(status);
        self.reconcile();
    }

    fn commit_weight(&mut self, weight: PatientWeight) {
        info!("Weight set to {}", weight);
        self.pending_weight = None;
        self.context.patient_weight = Some(weight);
        self.reconcile();
    }

    /// Re-run the hooks, then drop selections the new context no longer
    /// allows (over the weight limit, not stocked here). Dropping one entry
    /// can invalidate another, so this repeats until nothing is stale.
    fn reconcile(&mut self) {
        let env = self.engine.env(&self.context);
        let mut writes = self.store.reconcile(&env);

        for _ in 0..Category::ALL.len() {
            let stale = self.stale_selections();
            if stale.is_empty() {
                break;
            }
            for category in &stale {
                info!("Dropped {} selection: no longer available for this patient", category);
            }
            writes += stale.len();

            let patch = stale.into_iter().map(|c| (c, None)).collect();
            let env = self.engine.env(&self.context);
            self.store.set(patch, &env);
        }

        if writes > 0 {
            debug!("Context change adjusted {} selection(s)", writes);
        }
    }

    fn is_eligible(&self, category: Category, name: &str) -> bool {
        self.engine
            .eligible(category, &self.context, self.store.get())
            .any(|i| i.name == name)
    }

    fn stale_selections(&self) -> Vec<Category> {
        self.store
            .get()
            .iter()
            .filter(|(category, name)| !self.is_eligible(**category, name))
            .map(|(category, _)| *category)
            .collect()
    }

    // ===== SELECTION =====

    /// Select `name` for `category`, or deselect it if it is already the
    /// selection.
    pub fn select(&mut self, category: Category, name: &str) -> EquipmentResult<()> {
        let item = self.engine.catalog().get(name)?;
        if item.category != category {
            return Err(EquipmentError::WrongCategory {
                item: name.to_string(),
                expected: category,
                actual: item.category,
            });
        }

        if self.store.selected(category) == Some(name) {
            self.deselect(category);
            return Ok(());
        }

        if !self.is_eligible(category, name) {
            return Err(EquipmentError::NotEligible {
                item: name.to_string(),
            });
        }

        self.apply(SelectionPatch::from([(category, Some(item.name.clone()))]));
        Ok(())
    }

    pub fn deselect(&mut self, category: Category) {
        self.apply(SelectionPatch::from([(category, None)]));
    }

    fn apply(&mut self, patch: SelectionPatch) {
        let env = self.engine.env(&self.context);
        self.store.set(patch, &env);
    }

    // ===== DERIVED VIEWS =====

    pub fn plan(&self) -> CategoryPlan {
        self.engine.plan(&self.context, self.store.get())
    }

    pub fn eligible(&self, category: Category) -> EligibleItems<'_> {
        self.engine.eligible(category, &self.context, self.store.get())
    }

    /// Required categories without an eligible selection, in plan order.
    pub fn missing_required(&self) -> Vec<Category> {
        self.plan()
            .required
            .into_iter()
            .filter(|&c| match self.store.selected(c) {
                Some(name) => !self.is_eligible(c, name),
                None => true,
            })
            .collect()
    }

    pub fn can_complete(&self) -> bool {
        self.plan().is_ready() && self.missing_required().is_empty()
    }

    pub fn steps(&self) -> Vec<StepStatus> {
        let ward = self.location().map(|l| l.setting) == Some(CareSetting::Ward);

        let location = self.location().is_some()
            && (!ward
                || self
                    .context
                    .secondary_location
                    .as_deref()
                    .is_some_and(|w| !w.is_empty()));
        let patient_id = self.context.patient_id.is_some();
        let weight = self.context.patient_weight.is_some()
            && (!ward || self.context.dependency_status.is_some());

        vec![
            StepStatus { step: Step::Location, complete: location },
            StepStatus { step: Step::PatientId, complete: patient_id },
            StepStatus { step: Step::Weight, complete: weight },
            StepStatus { step: Step::Equipment, complete: self.can_complete() },
        ]
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        let plan = self.plan();
        self.engine.advisories(&self.context, self.store.get(), &plan)
    }

    pub fn summary(&self) -> EquipmentResult<OrderSummary> {
        build_summary(
            self.engine.catalog(),
            self.engine.rules(),
            &self.context,
            self.store.get(),
        )
    }

    /// Discard everything and start a new encounter.
    pub fn reset(&mut self) {
        info!("Session reset");
        self.context = EncounterContext::new();
        self.store.clear();
        self.pending_weight = None;
    }
}
