//! Clinical appropriateness assessment (§4.3): age band, contraindications,
//! provider type, polypharmacy, and prior PA history for the same drug class.

use pa_contracts::analysis::AnalysisContext;
use pa_contracts::evidence::{EvidenceItem, EvidenceType};

const CONTRAINDICATION_ICD10_PREFIXES: &[(&str, &[&str])] = &[
    ("type 1 diabetes", &["E10"]),
    ("diabetic ketoacidosis", &["E10.1", "E11.1"]),
    ("severe renal impairment", &["N18.6", "N19"]),
];

const POLYPHARMACY_THRESHOLD: usize = 10;

pub struct Appropriateness {
    pub score: f64,
    pub confidence: f64,
    pub rationale: String,
}

pub fn assess(context: &AnalysisContext) -> Appropriateness {
    let mut score = 0.5_f64;
    let mut factors: Vec<String> = Vec::new();

    if let Some(patient) = &context.patient_record {
        let age = patient.age;
        if (18..=85).contains(&age) {
            score += 0.1;
            factors.push("age appropriate".to_string());
        } else if age < 18 {
            score -= 0.2;
            factors.push("pediatric use requires special consideration".to_string());
        } else {
            score -= 0.1;
            factors.push("geriatric considerations needed".to_string());
        }

        if let Some(drug) = &context.drug_info {
            let mut has_contraindication = false;
            for (label, icd_prefixes) in CONTRAINDICATION_ICD10_PREFIXES {
                let named = drug.contraindications.iter().any(|c| c.to_lowercase().contains(label));
                if named
                    && patient
                        .diagnoses_icd10
                        .iter()
                        .any(|diag| icd_prefixes.iter().any(|prefix| diag.starts_with(prefix)))
                {
                    has_contraindication = true;
                    factors.push(format!("contraindication present: {label}"));
                    score -= 0.3;
                }
            }
            if !has_contraindication {
                score += 0.2;
                factors.push("no contraindications identified".to_string());
            }
        }

        let provider_lower = patient.provider_type.to_lowercase();
        if provider_lower.contains("specialist") || provider_lower.contains("endocrin") {
            score += 0.15;
            factors.push("specialist management".to_string());
        } else if !patient.provider_type.is_empty() {
            score += 0.05;
            factors.push(format!("{} management", patient.provider_type));
        }

        let med_count = patient.medication_history.len();
        if med_count > POLYPHARMACY_THRESHOLD {
            score -= 0.05;
            factors.push("significant polypharmacy".to_string());
        } else if med_count > 5 {
            factors.push("moderate medication burden".to_string());
        }
    }

    let score = score.clamp(0.0, 1.0);
    let confidence = if factors.len() >= 3 { 0.75 } else { 0.65 };

    let rationale = if factors.is_empty() {
        format!("clinical appropriateness score: {:.0}%. standard clinical profile", score * 100.0)
    } else {
        format!(
            "clinical appropriateness score: {:.0}%. key factors: {}",
            score * 100.0,
            factors.join(", ")
        )
    };

    Appropriateness { score, confidence, rationale }
}

pub fn clinical_appropriateness_evidence(context: &AnalysisContext, category_weight: f64) -> EvidenceItem {
    let appropriateness = assess(context);
    EvidenceItem::new(
        "clinical_assessment",
        EvidenceType::ClinicalAppropriateness,
        appropriateness.rationale,
        category_weight,
        appropriateness.score > 0.7,
        appropriateness.confidence,
    )
}
