//! Input-boundary validation for encounter fields.
//!
//! Raw text from the shell is checked here and turned into typed values;
//! malformed input is rejected with a field-level message and never reaches
//! the engine.

use thiserror::Error;

use super::types::{PatientId, PatientWeight};
use crate::error::{EquipmentError, EquipmentResult};
use crate::rules::{LocationDef, RulesConfig, WeightAlert};

/// A rejected input value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
    pub value: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>, value: &str) -> Self {
        Self {
            field,
            message: message.into(),
            value: value.to_string(),
        }
    }
}

/// Normalise and validate a patient identifier (NHI): three letters followed
/// by four digits. Letters are upper-cased.
pub fn parse_patient_id(raw: &str) -> Result<PatientId, FieldError> {
    let candidate = raw.trim().to_ascii_uppercase();
    let bytes = candidate.as_bytes();

    let ok = bytes.len() == 7
        && bytes[..3].iter().all(|b| b.is_ascii_uppercase())
        && bytes[3..].iter().all(|b| b.is_ascii_digit());

    if !ok {
        return Err(FieldError::new(
            "patient_id",
            "must be 3 letters followed by 4 digits (e.g. ABC1234)",
            raw,
        ));
    }

    Ok(PatientId(candidate))
}

pub fn parse_ward_name(raw: &str) -> Result<String, FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::new("ward_name", "ward name cannot be empty", raw));
    }
    Ok(name.to_string())
}

/// Parse an exact ward weight in whole kg. A trailing "kg" is accepted.
pub fn parse_ward_weight(raw: &str) -> Result<PatientWeight, FieldError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_suffix("kg")
        .or_else(|| trimmed.strip_suffix("KG"))
        .unwrap_or(trimmed)
        .trim();

    let kg: u32 = digits
        .parse()
        .map_err(|_| FieldError::new("weight", "weight must be a whole number of kg", raw))?;

    if kg == 0 {
        return Err(FieldError::new("weight", "weight must be greater than 0", raw));
    }

    Ok(PatientWeight::Exact(kg))
}

/// Weight for the ED band at `index` in the configured band list.
pub fn band_weight(rules: &RulesConfig, index: usize) -> EquipmentResult<PatientWeight> {
    let band = rules
        .weight_bands
        .get(index)
        .ok_or(EquipmentError::WeightBandOutOfRange {
            index,
            count: rules.weight_bands.len(),
        })?;

    Ok(PatientWeight::Band {
        min: band.min_kg,
        max: band.max_kg,
    })
}

/// Pre-commit hook for weights: the location's alert, if the proposed weight
/// reaches its threshold.
///
/// An open-ended band always reaches the threshold.
pub fn check_weight_alert<'a>(
    location: &'a LocationDef,
    weight: &PatientWeight,
) -> Option<&'a WeightAlert> {
    let alert = location.alert.as_ref()?;
    let reaches = match *weight {
        PatientWeight::Exact(kg) => kg >= alert.threshold_kg,
        PatientWeight::Band { min, max } => {
            min >= alert.threshold_kg || max.map_or(true, |m| m >= alert.threshold_kg)
        }
    };
    reaches.then_some(alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::default_rules;

    #[test]
    fn test_patient_id_upper_cased() {
        let id = parse_patient_id(" abc1234 ").unwrap();
        assert_eq!(id.as_str(), "ABC1234");
    }

    #[test]
    fn test_patient_id_rejects_bad_shapes() {
        for raw in ["", "AB1234", "ABCD123", "ABC12345", "1231234", "ABC12D4", "ÄBC1234"] {
            let err = parse_patient_id(raw).unwrap_err();
            assert_eq!(err.field, "patient_id", "Input {:?}", raw);
            assert_eq!(err.value, raw);
        }
    }

    #[test]
    fn test_ward_name_trimmed_and_required() {
        assert_eq!(parse_ward_name("  Ward 7 ").unwrap(), "Ward 7");
        assert!(parse_ward_name("   ").is_err());
    }

    #[test]
    fn test_ward_weight_parsing() {
        assert_eq!(parse_ward_weight("320").unwrap(), PatientWeight::Exact(320));
        assert_eq!(parse_ward_weight(" 320 kg").unwrap(), PatientWeight::Exact(320));
        assert!(parse_ward_weight("heavy").is_err());
        assert!(parse_ward_weight("-5").is_err());
        assert!(parse_ward_weight("0").is_err());
        assert!(parse_ward_weight("").is_err());
    }

    #[test]
    fn test_band_weight_lookup() {
        let rules = default_rules();
        assert_eq!(
            band_weight(&rules, 1).unwrap(),
            PatientWeight::Band { min: 250, max: Some(350) }
        );
        assert!(matches!(
            band_weight(&rules, 9),
            Err(EquipmentError::WeightBandOutOfRange { index: 9, count: 3 })
        ));
    }

    #[test]
    fn test_hutt_ed_band_over_threshold_triggers_alert() {
        let rules = default_rules();
        let hutt_ed = rules.location("F3S638-G").unwrap();
        let band = PatientWeight::Band { min: 250, max: Some(350) };
        let alert = check_weight_alert(hutt_ed, &band).expect("250-350 band should alert at 200kg");
        assert_eq!(alert.threshold_kg, 200);
        assert!(alert.message.contains("Hutt Emergency"));
    }

    #[test]
    fn test_band_straddling_threshold_alerts() {
        let rules = default_rules();
        let hutt_ed = rules.location("F3S638-G").unwrap();
        let band = PatientWeight::Band { min: 180, max: Some(250) };
        assert!(check_weight_alert(hutt_ed, &band).is_some());
    }

    #[test]
    fn test_band_below_threshold_no_alert() {
        let rules = default_rules();
        let wellington_ed = rules.location("F3M163-E").unwrap();
        let band = PatientWeight::Band { min: 250, max: Some(350) };
        assert!(check_weight_alert(wellington_ed, &band).is_none());
    }

    #[test]
    fn test_open_band_always_alerts() {
        let rules = default_rules();
        let wellington_ed = rules.location("F3M163-E").unwrap();
        let band = PatientWeight::Band { min: 350, max: None };
        assert!(check_weight_alert(wellington_ed, &band).is_some());
    }

    #[test]
    fn test_location_without_alert() {
        let rules = default_rules();
        let ward = rules.location("F06033-K").unwrap();
        assert!(check_weight_alert(ward, &PatientWeight::Exact(600)).is_none());
    }
}
