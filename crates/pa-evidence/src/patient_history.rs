//! Patient history fit score (§4.3): how well a patient's chart supports
//! this particular drug, starting from a neutral 0.5 baseline.

use pa_contracts::drug::DrugInformation;
use pa_contracts::evidence::{EvidenceItem, EvidenceType};
use pa_contracts::patient::PatientRecord;

const PREREQUISITE_MEDICATIONS: &[&str] = &["metformin", "lisinopril", "atorvastatin", "simvastatin"];

const CONDITION_ICD10_PREFIXES: &[(&str, &[&str])] = &[
    ("diabetes", &["E11", "E10"]),
    ("heart failure", &["I50"]),
    ("hypertension", &["I10", "I11", "I12", "I13"]),
    ("kidney", &["N18", "N19"]),
];

const FAILURE_KEYWORDS: &[&str] = &["failed", "insufficient", "inadequate", "not responding", "refractory"];

/// `[0, 1]` fit score, starting at 0.5 and adjusted by the factors named in
/// §4.3's patient history rule.
pub fn patient_history_score(patient: &PatientRecord, drug: &DrugInformation) -> f64 {
    let mut score = 0.5_f64;

    let tried_prerequisites = patient
        .medication_history
        .iter()
        .filter(|med| {
            let lower = med.to_lowercase();
            PREREQUISITE_MEDICATIONS.iter().any(|prereq| lower.contains(prereq))
        })
        .count();
    if tried_prerequisites > 0 {
        score += 0.2 * (tried_prerequisites as f64 / 2.0).min(1.0);
    }

    if !patient.diagnoses_icd10.is_empty() && !drug.indications.is_empty() {
        for indication in &drug.indications {
            let indication_lower = indication.to_lowercase();
            for (condition, icd_prefixes) in CONDITION_ICD10_PREFIXES {
                if indication_lower.contains(condition)
                    && patient
                        .diagnoses_icd10
                        .iter()
                        .any(|diag| icd_prefixes.iter().any(|prefix| diag.starts_with(prefix)))
                {
                    score += 0.15;
                }
            }
        }
    }

    if let Some(hba1c_raw) = patient.labs.get("HbA1c") {
        if let Ok(hba1c) = hba1c_raw.trim_end_matches('%').parse::<f64>() {
            if hba1c > 8.0 {
                score += 0.15;
            } else if hba1c > 7.0 {
                score += 0.1;
            }
        }
    }
    if let Some(egfr_raw) = patient.labs.get("eGFR") {
        if let Ok(egfr) = egfr_raw.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.').parse::<f64>() {
            if egfr >= 30.0 {
                score += 0.05;
            }
        }
    }

    if patient.notes.iter().any(|note| {
        let lower = note.to_lowercase();
        FAILURE_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }) {
        score += 0.15;
    }

    if let Some(adherence) = patient.adherence_score {
        if adherence > 0.8 {
            score += 0.10;
        }
    }

    score.clamp(0.0, 1.0)
}

pub fn patient_history_evidence(patient: &PatientRecord, drug: &DrugInformation, drug_name: &str, category_weight: f64) -> EvidenceItem {
    let score = patient_history_score(patient, drug);
    let fit = if score > 0.8 {
        "excellent"
    } else if score > 0.6 {
        "good"
    } else if score > 0.4 {
        "moderate"
    } else {
        "poor"
    };
    let content = format!("patient history indicates {fit} fit for {drug_name} (score: {score:.2})");
    EvidenceItem::new("patient_history", EvidenceType::PatientHistory, content, category_weight, score > 0.6, 0.8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn drug(indications: Vec<&str>) -> DrugInformation {
        DrugInformation {
            canonical_name: "Empagliflozin".into(),
            drug_class: "SGLT2 inhibitor".into(),
            mechanism: String::new(),
            indications: indications.into_iter().map(String::from).collect(),
            contraindications: vec![],
            warnings: vec![],
            monitoring_requirements: vec![],
            dosing: Default::default(),
        }
    }

    fn base_patient() -> PatientRecord {
        PatientRecord {
            patient_id: "patient-001".into(),
            age: 52,
            gender: "M".into(),
            diagnoses_icd10: vec![],
            medication_history: vec![],
            labs: Default::default(),
            notes: vec![],
            provider_type: "Endocrinologist".into(),
            adherence_score: None,
            requested_quantity: None,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn neutral_chart_scores_baseline() {
        let patient = base_patient();
        let drug = drug(vec![]);
        assert_eq!(patient_history_score(&patient, &drug), 0.5);
    }

    #[test]
    fn prerequisite_history_and_diagnosis_alignment_raise_score() {
        let mut patient = base_patient();
        patient.medication_history = vec!["Metformin 500mg".to_string()];
        patient.diagnoses_icd10 = vec!["E11.9".to_string()];
        let drug = drug(vec!["type 2 diabetes"]);
        let score = patient_history_score(&patient, &drug);
        assert!(score > 0.5);
    }

    #[test]
    fn elevated_hba1c_raises_score() {
        let mut patient = base_patient();
        patient.labs.insert("HbA1c".to_string(), "9.1%".to_string());
        let drug = drug(vec![]);
        let score = patient_history_score(&patient, &drug);
        assert!((score - 0.65).abs() < 1e-9);
    }
}
