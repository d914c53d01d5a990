//! Order review: the collected context and one line per selected item, with
//! the site's procurement instruction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Catalog, Category};
use crate::encounter::{DependencyStatus, EncounterContext};
use crate::error::{EquipmentError, EquipmentResult};
use crate::rules::RulesConfig;
use crate::selection::SelectionState;

const INCLUDED_WITH_BED: &str = "Included with bed";
const NO_PROCUREMENT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub category: Category,
    pub name: String,
    /// Safe working load; omitted for accessories and unbounded items
    pub max_load_kg: Option<u32>,
    pub procurement: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub location_code: String,
    pub location_label: String,
    pub site: String,
    pub ward_name: Option<String>,
    pub patient_id: Option<String>,
    pub dependency: Option<DependencyStatus>,
    pub weight: Option<String>,
    pub started_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl OrderSummary {
    pub fn line(&self, category: Category) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.category == category)
    }
}

pub fn build_summary(
    catalog: &Catalog,
    rules: &RulesConfig,
    context: &EncounterContext,
    selections: &SelectionState,
) -> EquipmentResult<OrderSummary> {
    let code = context
        .location
        .as_deref()
        .ok_or(EquipmentError::LocationNotSet)?;
    let location = rules
        .location(code)
        .ok_or_else(|| EquipmentError::UnknownLocation(code.to_string()))?;

    let bed = selections.get(&Category::Bed);

    let mut lines = Vec::with_capacity(selections.len());
    for (&category, name) in selections {
        let item = catalog.get(name)?;

        let max_load_kg = match category {
            Category::Accessories => None,
            _ => item.effective_max_load(),
        };

        let bundled = category == Category::Mattress
            && bed.is_some_and(|b| item.is_default_for(b));
        let procurement = if bundled {
            INCLUDED_WITH_BED
        } else {
            item.procurement_for(&location.site).unwrap_or(NO_PROCUREMENT)
        };

        lines.push(OrderLine {
            category,
            name: item.name.clone(),
            max_load_kg,
            procurement: procurement.to_string(),
            notes: item.notes.clone(),
        });
    }

    Ok(OrderSummary {
        location_code: location.code.clone(),
        location_label: location.label.clone(),
        site: location.site.clone(),
        ward_name: context
            .secondary_location
            .clone()
            .filter(|w| !w.is_empty()),
        patient_id: context.patient_id.as_ref().map(|p| p.to_string()),
        dependency: context.dependency_status,
        weight: context.patient_weight.map(|w| w.to_string()),
        started_at: context.started_at,
        lines,
    })
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Location:   {} ({})", self.location_label, self.location_code)?;
        if let Some(ward) = &self.ward_name {
            writeln!(f, "Ward:       {}", ward)?;
        }
        if let Some(id) = &self.patient_id {
            writeln!(f, "NHI:        {}", id)?;
        }
        if let Some(weight) = &self.weight {
            writeln!(f, "Weight:     {}", weight)?;
        }
        if let Some(dependency) = self.dependency {
            writeln!(f, "Dependency: {}", dependency)?;
        }
        writeln!(f)?;

        for line in &self.lines {
            match line.max_load_kg {
                Some(kg) => writeln!(f, "{}: {} (SWL {} kg)", line.category, line.name, kg)?,
                None => writeln!(f, "{}: {}", line.category, line.name)?,
            }
            writeln!(f, "    {}", line.procurement)?;
            if let Some(notes) = &line.notes {
                writeln!(f, "    {}", notes)?;
            }
        }
        Ok(())
    }
}
