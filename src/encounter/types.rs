use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Care setting of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareSetting {
    /// Emergency department: weight is entered as a band
    Emergency,
    /// Inpatient ward: exact weight plus dependency status
    Ward,
}

/// Clinical mobility classification, asked for on wards only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Dependent,
    Independent,
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyStatus::Dependent => f.write_str("Dependent"),
            DependencyStatus::Independent => f.write_str("Independent"),
        }
    }
}

/// Patient weight in kg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientWeight {
    /// Measured weight (wards)
    Exact(u32),
    /// Weight band chosen in ED; `max` is `None` for open-ended bands
    Band { min: u32, max: Option<u32> },
}

impl PatientWeight {
    /// Weight used for capacity checks.
    ///
    /// Bands resolve to their upper bound, or the lower bound when open-ended,
    /// so the heavier estimate is always checked against load limits.
    pub fn effective_kg(&self) -> u32 {
        match *self {
            PatientWeight::Exact(kg) => kg,
            PatientWeight::Band { min, max } => max.unwrap_or(min),
        }
    }
}

impl fmt::Display for PatientWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PatientWeight::Exact(kg) => write!(f, "{} kg", kg),
            PatientWeight::Band { min, max: Some(max) } => write!(f, "{} – {} kg", min, max),
            PatientWeight::Band { min, max: None } => write!(f, "{}+ kg", min),
        }
    }
}

/// Validated patient identifier: three upper-case letters then four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PatientId(pub(crate) String);

impl PatientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything collected about the patient for one encounter.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterContext {
    pub location: Option<String>,
    /// Ward name; `Some("")` means a ward is chosen but not yet named
    pub secondary_location: Option<String>,
    pub patient_id: Option<PatientId>,
    pub patient_weight: Option<PatientWeight>,
    pub dependency_status: Option<DependencyStatus>,
    pub started_at: DateTime<Utc>,
}

impl EncounterContext {
    pub fn new() -> Self {
        Self {
            location: None,
            secondary_location: None,
            patient_id: None,
            patient_weight: None,
            dependency_status: None,
            started_at: Utc::now(),
        }
    }

    pub fn effective_weight(&self) -> Option<u32> {
        self.patient_weight.map(|w| w.effective_kg())
    }
}

impl Default for EncounterContext {
    fn default() -> Self {
        Self::new()
    }
}
