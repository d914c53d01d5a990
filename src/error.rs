use thiserror::Error;

use crate::catalog::Category;

#[derive(Debug, Error)]
pub enum EquipmentError {
    #[error("Equipment not found: {0}")]
    NotFound(String),

    #[error("Unknown location code: {0}")]
    UnknownLocation(String),

    #[error("{item} is a {actual} item, not {expected}")]
    WrongCategory {
        item: String,
        expected: Category,
        actual: Category,
    },

    #[error("{item} is not available for this patient and location")]
    NotEligible { item: String },

    #[error("No location has been chosen")]
    LocationNotSet,

    #[error("No weight is awaiting confirmation")]
    NoPendingWeight,

    #[error("Weight band {index} does not exist ({count} bands configured)")]
    WeightBandOutOfRange { index: usize, count: usize },

    #[error("Inconsistent configuration ({} issue(s)):\n{}", .0.len(), .0.join("\n"))]
    InconsistentConfig(Vec<String>),
}

pub type EquipmentResult<T> = std::result::Result<T, EquipmentError>;
