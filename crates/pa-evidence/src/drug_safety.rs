//! Drug safety evidence (§4.3): checks patient demographics and labs against
//! the drug's contraindications for concrete, named concerns.

use pa_contracts::drug::DrugSafetySummary;
use pa_contracts::evidence::{EvidenceItem, EvidenceType};
use pa_contracts::patient::PatientRecord;

const CHILDBEARING_AGE_MIN: u8 = 15;
const CHILDBEARING_AGE_MAX: u8 = 49;
const EGFR_RENAL_IMPAIRMENT_THRESHOLD: f64 = 30.0;
const MAX_WARNINGS_BEFORE_OPPOSE: usize = 3;

fn has_contraindication_matching(safety: &DrugSafetySummary, term: &str) -> bool {
    safety.contraindications.iter().any(|c| c.to_lowercase().contains(term))
}

/// Concrete, human-readable safety concerns detected for this patient/drug
/// pairing. Empty means no demographic/lab-driven concern was found.
pub fn detect_concerns(patient: &PatientRecord, safety: &DrugSafetySummary) -> Vec<String> {
    let mut concerns = Vec::new();

    let is_childbearing_age = patient.gender.eq_ignore_ascii_case("F")
        && patient.age >= CHILDBEARING_AGE_MIN
        && patient.age <= CHILDBEARING_AGE_MAX;
    if is_childbearing_age && has_contraindication_matching(safety, "pregnan") {
        concerns.push("female patient of childbearing age with a pregnancy contraindication".to_string());
    }

    if let Some(egfr_raw) = patient.labs.get("eGFR") {
        if let Ok(egfr) = egfr_raw.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.').parse::<f64>() {
            if egfr < EGFR_RENAL_IMPAIRMENT_THRESHOLD && has_contraindication_matching(safety, "renal") {
                concerns.push(format!("renal impairment (eGFR {egfr}) with a renal contraindication"));
            }
        }
    }

    concerns
}

pub fn drug_safety_evidence(patient: &PatientRecord, safety: &DrugSafetySummary, category_weight: f64) -> EvidenceItem {
    let concerns = detect_concerns(patient, safety);

    let (content, supports, confidence) = if !concerns.is_empty() {
        (concerns.join("; "), false, 0.9)
    } else if safety.warnings.len() > MAX_WARNINGS_BEFORE_OPPOSE {
        (
            format!("{} safety warnings on file, above the routine threshold", safety.warnings.len()),
            false,
            0.7,
        )
    } else {
        ("no demographic or lab-driven safety concerns identified".to_string(), true, 0.8)
    };

    EvidenceItem::new("drug_safety_analysis", EvidenceType::DrugSafety, content, category_weight, supports, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pa_contracts::drug::SafetyProfile;

    fn patient(gender: &str, age: u8, egfr: Option<&str>) -> PatientRecord {
        let mut labs = std::collections::BTreeMap::new();
        if let Some(v) = egfr {
            labs.insert("eGFR".to_string(), v.to_string());
        }
        PatientRecord {
            patient_id: "patient-001".into(),
            age,
            gender: gender.into(),
            diagnoses_icd10: vec![],
            medication_history: vec![],
            labs,
            notes: vec![],
            provider_type: "Endocrinologist".into(),
            adherence_score: None,
            requested_quantity: None,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    fn safety(contraindications: Vec<&str>, warning_count: usize) -> DrugSafetySummary {
        DrugSafetySummary {
            drug_class: "test".into(),
            warnings: vec!["warning".to_string(); warning_count],
            contraindications: contraindications.into_iter().map(String::from).collect(),
            monitoring_requirements: vec![],
            safety_profile: SafetyProfile::Minimal,
        }
    }

    #[test]
    fn pregnancy_concern_opposes_with_high_confidence() {
        let patient = patient("F", 28, None);
        let safety = safety(vec!["Pregnancy"], 0);
        let evidence = drug_safety_evidence(&patient, &safety, 0.10);
        assert!(!evidence.supports_approval);
        assert_eq!(evidence.confidence, 0.9);
    }

    #[test]
    fn renal_concern_opposes_with_high_confidence() {
        let patient = patient("M", 60, Some("25 mL/min"));
        let safety = safety(vec!["Severe Renal Impairment"], 0);
        let evidence = drug_safety_evidence(&patient, &safety, 0.10);
        assert!(!evidence.supports_approval);
    }

    #[test]
    fn many_warnings_without_concern_opposes_moderately() {
        let patient = patient("M", 60, None);
        let safety = safety(vec![], 4);
        let evidence = drug_safety_evidence(&patient, &safety, 0.10);
        assert!(!evidence.supports_approval);
        assert_eq!(evidence.confidence, 0.7);
    }

    #[test]
    fn no_concerns_and_few_warnings_supports() {
        let patient = patient("M", 60, None);
        let safety = safety(vec![], 1);
        let evidence = drug_safety_evidence(&patient, &safety, 0.10);
        assert!(evidence.supports_approval);
        assert_eq!(evidence.confidence, 0.8);
    }
}
