//! Drug information and safety types (§3, §4.2.3).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Semantic dosing keys used in `DrugInformation::dosing`.
pub const DOSING_INITIAL: &str = "initial";
pub const DOSING_MAXIMUM: &str = "maximum";
pub const DOSING_RENAL_ADJUSTMENT: &str = "renal_adjustment";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugInformation {
    pub canonical_name: String,
    pub drug_class: String,
    pub mechanism: String,
    pub indications: Vec<String>,
    pub contraindications: Vec<String>,
    pub warnings: Vec<String>,
    pub monitoring_requirements: Vec<String>,
    /// indication -> dose string, keyed by `DOSING_*` constants where applicable.
    pub dosing: BTreeMap<String, String>,
}

/// Four-band safety classification derived from warning/contraindication counts
/// (thresholds 5/3/1, §4.2.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyProfile {
    Minimal,
    Low,
    Moderate,
    HighRisk,
}

impl SafetyProfile {
    /// Derive the safety band from warning and contraindication counts.
    pub fn from_counts(warnings: usize, contraindications: usize) -> Self {
        let total = warnings + contraindications;
        if total >= 5 {
            SafetyProfile::HighRisk
        } else if total >= 3 {
            SafetyProfile::Moderate
        } else if total >= 1 {
            SafetyProfile::Low
        } else {
            SafetyProfile::Minimal
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugSafetySummary {
    pub drug_class: String,
    pub warnings: Vec<String>,
    pub contraindications: Vec<String>,
    pub monitoring_requirements: Vec<String>,
    pub safety_profile: SafetyProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_profile_thresholds() {
        assert_eq!(SafetyProfile::from_counts(0, 0), SafetyProfile::Minimal);
        assert_eq!(SafetyProfile::from_counts(1, 0), SafetyProfile::Low);
        assert_eq!(SafetyProfile::from_counts(2, 1), SafetyProfile::Moderate);
        assert_eq!(SafetyProfile::from_counts(3, 2), SafetyProfile::HighRisk);
    }

    #[test]
    fn safety_profile_orders_least_to_most_severe() {
        assert!(SafetyProfile::Minimal < SafetyProfile::Low);
        assert!(SafetyProfile::Low < SafetyProfile::Moderate);
        assert!(SafetyProfile::Moderate < SafetyProfile::HighRisk);
    }
}
