//! Patient record types (§3) and the role model that gates access to them
//! (§4.2.2).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller role for the Patient Service. Controls which operations are
/// permitted and how returned records are filtered for privacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Physician,
    Nurse,
    Admin,
    System,
    Researcher,
}

impl Role {
    /// Operations this role may perform, per the §4.2.2 access table.
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Role::Physician => &["read", "write", "search"],
            Role::Nurse => &["read", "search"],
            Role::Admin | Role::System => &["read", "write", "search", "audit", "export"],
            Role::Researcher => &["read", "search"],
        }
    }

    pub fn can(self, operation: &str) -> bool {
        self.permissions().contains(&operation)
    }

    pub fn is_researcher(self) -> bool {
        matches!(self, Role::Researcher)
    }
}

/// A single lab value with its recorded unit string, e.g. `"9.2%"`.
pub type LabValues = BTreeMap<String, String>;

/// Immutable (within a single orchestration) snapshot of a patient's chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub age: u8,
    /// `M`, `F`, `O`, or `U`.
    pub gender: String,
    /// ICD-10 codes, in chart order.
    pub diagnoses_icd10: Vec<String>,
    /// Medication names, in chart order (most recent last).
    pub medication_history: Vec<String>,
    pub labs: LabValues,
    pub notes: Vec<String>,
    pub provider_type: String,
    /// Adherence score in `[0, 1]`, if known.
    pub adherence_score: Option<f64>,
    pub requested_quantity: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl PatientRecord {
    /// Fields mutable via `PatientService::update` (§4.2.2).
    pub const MUTABLE_FIELDS: &'static [&'static str] = &[
        "diagnoses_icd10",
        "medication_history",
        "labs",
        "notes",
        "age",
        "gender",
        "provider_type",
    ];

    pub fn has_diagnosis(&self, code: &str) -> bool {
        self.diagnoses_icd10
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }

    pub fn has_taken(&self, drug_substring: &str) -> bool {
        let needle = drug_substring.to_lowercase();
        self.medication_history
            .iter()
            .any(|m| m.to_lowercase().contains(&needle))
    }
}

/// A privacy-filtered copy of a `PatientRecord` returned to a caller.
/// Researchers receive anonymized identifiers and stripped PHI fields;
/// everything else is a defensive (deep) copy of the stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredPatientRecord {
    pub patient_id: String,
    pub age: u8,
    pub gender: String,
    pub diagnoses_icd10: Vec<String>,
    pub medication_history: Vec<String>,
    pub labs: LabValues,
    pub notes: Vec<String>,
    pub provider_type: String,
    pub adherence_score: Option<f64>,
    pub requested_quantity: Option<u32>,
    pub last_updated: DateTime<Utc>,
}

/// Search criteria accepted by `PatientService::search` (§4.2.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub name_substring: Option<String>,
    pub age_exact: Option<u8>,
    pub age_range: Option<(u8, u8)>,
    pub diagnosis: Option<String>,
    pub medication: Option<String>,
}

/// A single ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSearchHit {
    pub record: FilteredPatientRecord,
    pub match_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_permissions_match_access_table() {
        assert!(Role::Physician.can("write"));
        assert!(!Role::Nurse.can("write"));
        assert!(Role::Admin.can("audit"));
        assert!(!Role::Researcher.can("write"));
    }

    #[test]
    fn has_diagnosis_is_case_insensitive() {
        let rec = PatientRecord {
            patient_id: "patient-001".into(),
            age: 52,
            gender: "M".into(),
            diagnoses_icd10: vec!["e11.9".into()],
            medication_history: vec![],
            labs: LabValues::new(),
            notes: vec![],
            provider_type: "Endocrinologist".into(),
            adherence_score: Some(0.92),
            requested_quantity: None,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        };
        assert!(rec.has_diagnosis("E11.9"));
        assert!(!rec.has_diagnosis("I10"));
    }
}
