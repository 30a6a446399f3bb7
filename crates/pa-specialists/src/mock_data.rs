//! Simulated clinical, pharmacy, and payer data for the specialist services.
//!
//! All data in this module is hardcoded and fictional. No external systems
//! are contacted. This module acts as a stand-in for real EHR, drug
//! database, and payer connections in a production deployment.

use std::collections::BTreeMap;

use chrono::Utc;

use pa_contracts::drug::{DrugInformation, DOSING_INITIAL, DOSING_MAXIMUM, DOSING_RENAL_ADJUSTMENT};
use pa_contracts::patient::{LabValues, PatientRecord};
use pa_contracts::policy::{AlternativeDrug, Criterion, CriterionKind, InsurerPolicy, Severity};
use pa_contracts::analysis::GuidelineSnippet;
use pa_contracts::policy::CoverageStatus;

/// Mock patient chart keyed by normalized `patient_id`.
pub fn patient_record(patient_id: &str) -> Option<PatientRecord> {
    match patient_id {
        "patient-001" => Some(PatientRecord {
            patient_id: "patient-001".to_string(),
            age: 52,
            gender: "M".to_string(),
            diagnoses_icd10: vec!["E11.9".to_string(), "I10".to_string()],
            medication_history: vec!["Metformin".to_string(), "Lisinopril".to_string()],
            labs: labs(&[("HbA1c", "9.2%"), ("eGFR", "68 mL/min")]),
            notes: vec!["Prior trial of metformin insufficient to reach glycemic goal".to_string()],
            provider_type: "Endocrinologist".to_string(),
            adherence_score: Some(0.92),
            requested_quantity: Some(30),
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }),
        "patient-002" => Some(PatientRecord {
            patient_id: "patient-002".to_string(),
            age: 35,
            gender: "F".to_string(),
            diagnoses_icd10: vec!["E11.9".to_string()],
            medication_history: vec![],
            labs: labs(&[("HbA1c", "7.8%")]),
            notes: vec![],
            provider_type: "Primary Care".to_string(),
            adherence_score: None,
            requested_quantity: Some(60),
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }),
        _ => None,
    }
}

fn labs(pairs: &[(&str, &str)]) -> LabValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Mock drug information keyed by normalized canonical name.
pub fn drug_information(normalized_name: &str) -> Option<DrugInformation> {
    match normalized_name {
        "empagliflozin" => Some(DrugInformation {
            canonical_name: "Empagliflozin".to_string(),
            drug_class: "SGLT2 inhibitor".to_string(),
            mechanism: "Inhibits renal glucose reabsorption".to_string(),
            indications: vec!["Type 2 diabetes mellitus".to_string(), "Heart failure".to_string()],
            contraindications: vec!["Severe renal impairment (eGFR < 30)".to_string()],
            warnings: vec![
                "Risk of diabetic ketoacidosis".to_string(),
                "Risk of lower limb amputation".to_string(),
                "Genital mycotic infections".to_string(),
            ],
            monitoring_requirements: vec!["Renal function".to_string(), "Volume status".to_string()],
            dosing: dosing(&[
                (DOSING_INITIAL, "10 mg once daily"),
                (DOSING_MAXIMUM, "25 mg once daily"),
                (DOSING_RENAL_ADJUSTMENT, "not recommended below eGFR 30"),
            ]),
        }),
        "metformin" => Some(DrugInformation {
            canonical_name: "Metformin".to_string(),
            drug_class: "Biguanide".to_string(),
            mechanism: "Decreases hepatic glucose production".to_string(),
            indications: vec!["Type 2 diabetes mellitus".to_string()],
            contraindications: vec!["Severe renal impairment".to_string()],
            warnings: vec!["Risk of lactic acidosis".to_string()],
            monitoring_requirements: vec!["Renal function".to_string(), "Vitamin B12".to_string()],
            dosing: dosing(&[
                (DOSING_INITIAL, "500 mg twice daily"),
                (DOSING_MAXIMUM, "2550 mg per day"),
                (DOSING_RENAL_ADJUSTMENT, "reduce dose below eGFR 45"),
            ]),
        }),
        "warfarin" => Some(DrugInformation {
            canonical_name: "Warfarin".to_string(),
            drug_class: "Vitamin K antagonist".to_string(),
            mechanism: "Inhibits vitamin K-dependent clotting factor synthesis".to_string(),
            indications: vec!["Atrial fibrillation".to_string(), "Venous thromboembolism".to_string()],
            contraindications: vec!["Active bleeding".to_string(), "Pregnancy".to_string()],
            warnings: vec!["Bleeding risk".to_string(), "Narrow therapeutic index".to_string()],
            monitoring_requirements: vec!["INR".to_string()],
            dosing: dosing(&[(DOSING_INITIAL, "individualized, per INR response")]),
        }),
        _ => None,
    }
}

fn dosing(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Known interaction pairs (order-independent). Returns
/// `(severity, description, management)`.
pub fn known_interaction(a: &str, b: &str) -> Option<(&'static str, &'static str, &'static str)> {
    let pair_is = |x: &str, y: &str| (a == x && b == y) || (a == y && b == x);

    if pair_is("warfarin", "aspirin") {
        Some((
            "major",
            "both agents inhibit platelet function and increase bleeding risk via distinct pathways",
            "avoid concurrent use; if clinically necessary, monitor INR weekly and watch for bleeding",
        ))
    } else if pair_is("metformin", "contrast dye") || pair_is("metformin", "contrast-dye") {
        Some((
            "major",
            "iodinated contrast may cause acute kidney injury, impairing metformin clearance",
            "withhold metformin 48 hours before and after contrast administration",
        ))
    } else if pair_is("lisinopril", "potassium") {
        Some((
            "moderate",
            "ACE inhibitors reduce aldosterone secretion, decreasing potassium excretion",
            "monitor serum potassium within 1 week of starting or adjusting doses",
        ))
    } else if pair_is("amoxicillin", "ibuprofen") {
        Some((
            "minor",
            "NSAIDs may slightly reduce the renal clearance of amoxicillin at high doses",
            "monitor for reduced antibiotic efficacy in patients with renal impairment",
        ))
    } else {
        None
    }
}

/// Mock insurer policy keyed by `(insurer, normalized drug name)`.
pub fn insurer_policy(insurer: &str, normalized_drug: &str) -> Option<InsurerPolicy> {
    match (insurer, normalized_drug) {
        ("uhc", "empagliflozin") => Some(InsurerPolicy {
            insurer: "UHC".to_string(),
            drug_name: "Empagliflozin".to_string(),
            policy_version: "2026.1".to_string(),
            coverage_status: CoverageStatus::CoveredWithPA,
            tier: Some(3),
            monthly_cost: 450.0,
            criteria: vec![
                Criterion {
                    id: "diag-1".to_string(),
                    description: "diagnosis of type 2 diabetes".to_string(),
                    severity: Severity::Critical,
                    required: true,
                    kind: CriterionKind::Diagnosis {
                        required_codes: ["E11.9".to_string()].into_iter().collect(),
                    },
                },
                Criterion {
                    id: "step-1".to_string(),
                    description: "prior trial of metformin".to_string(),
                    severity: Severity::Critical,
                    required: true,
                    kind: CriterionKind::StepTherapy {
                        required_prior_drug: "metformin".to_string(),
                        duration_days: None,
                    },
                },
                Criterion {
                    id: "lab-1".to_string(),
                    description: "renal function adequate".to_string(),
                    severity: Severity::Moderate,
                    required: true,
                    kind: CriterionKind::LabValue {
                        test_name: "eGFR".to_string(),
                        min: Some(30.0),
                        max: None,
                    },
                },
            ],
            quantity_limit_units_per_fill: Some(30),
            alternatives: vec![AlternativeDrug {
                drug_name: "Dapagliflozin".to_string(),
                coverage_status: CoverageStatus::CoveredWithRestrictions,
                tier: Some(2),
                prior_auth_required: CoverageStatus::CoveredWithRestrictions.requires_pa_review(),
                rationale: String::new(),
            }],
        }),
        ("uhc", "metformin") => Some(InsurerPolicy {
            insurer: "UHC".to_string(),
            drug_name: "Metformin".to_string(),
            policy_version: "2026.1".to_string(),
            coverage_status: CoverageStatus::Covered,
            tier: Some(1),
            monthly_cost: 12.0,
            criteria: vec![],
            quantity_limit_units_per_fill: None,
            alternatives: vec![],
        }),
        _ => None,
    }
}

/// Mock guideline snippets keyed by normalized drug name.
pub fn guidelines_for(normalized_drug: &str) -> Vec<GuidelineSnippet> {
    match normalized_drug {
        "empagliflozin" => vec![
            GuidelineSnippet {
                text: "ADA Standards of Care recommend SGLT2 inhibitors as preferred second-line agents for patients with established cardiovascular disease or chronic kidney disease".to_string(),
                relevance_score: 0.9,
                source: "ADA Standards of Care".to_string(),
                year: 2025,
            },
            GuidelineSnippet {
                text: "Guidelines recommend caution with SGLT2 inhibitors in patients with recurrent genital mycotic infections".to_string(),
                relevance_score: 0.6,
                source: "Endocrine Society".to_string(),
                year: 2024,
            },
        ],
        "metformin" => vec![GuidelineSnippet {
            text: "Metformin remains the first-line and standard of care agent for type 2 diabetes absent contraindication".to_string(),
            relevance_score: 0.95,
            source: "ADA Standards of Care".to_string(),
            year: 2025,
        }],
        _ => vec![],
    }
}
