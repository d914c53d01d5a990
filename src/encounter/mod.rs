//! Encounter context: the patient facts collected step by step, and the
//! input-boundary checks that guard them.

pub mod intake;
mod types;

pub use intake::{check_weight_alert, FieldError};
pub use types::*;
