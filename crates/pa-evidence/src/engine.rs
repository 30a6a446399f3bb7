//! Assembles all per-dimension evidence into one ordered sequence and scores
//! it into a preliminary approval score and a confidence score (§4.3).

use pa_contracts::analysis::AnalysisContext;
use pa_contracts::evidence::EvidenceItem;

use crate::clinical_appropriateness::clinical_appropriateness_evidence;
use crate::drug_safety::drug_safety_evidence;
use crate::guideline::guideline_support_evidence;
use crate::interaction::interaction_evidence;
use crate::patient_history::patient_history_evidence;
use crate::policy_criteria::policy_criteria_evidence;
use crate::weights;

/// Evidence plus the two scalar scores derived from it.
pub struct EvidenceAssessment {
    pub items: Vec<EvidenceItem>,
    pub preliminary_score: f64,
    pub confidence_score: f64,
}

pub fn assess(context: &AnalysisContext) -> EvidenceAssessment {
    let mut items = Vec::new();

    if let Some(decision) = &context.coverage_decision {
        items.extend(policy_criteria_evidence(decision, weights::POLICY_CRITERIA_MET));
    }

    if !context.guidelines.is_empty() {
        items.extend(guideline_support_evidence(&context.guidelines, weights::GUIDELINE_SUPPORT));
    }

    if let Some(interactions) = &context.interaction_check {
        items.push(interaction_evidence(interactions, weights::DRUG_INTERACTIONS));
    }

    if let (Some(patient), Some(safety)) = (&context.patient_record, &context.drug_safety) {
        items.push(drug_safety_evidence(patient, safety, weights::DRUG_SAFETY));
    }

    if let (Some(patient), Some(drug)) = (&context.patient_record, &context.drug_info) {
        items.push(patient_history_evidence(patient, drug, &context.drug_name, weights::PATIENT_HISTORY));
    }

    items.push(clinical_appropriateness_evidence(context, weights::CLINICAL_APPROPRIATENESS));

    let preliminary_score = preliminary_score(&items);
    let confidence_score = confidence_score(&items, context);

    EvidenceAssessment { items, preliminary_score, confidence_score }
}

/// `Σ wᵢ · [supportsᵢ] · confidenceᵢ / Σ wᵢ`; `0.5` when there's nothing to
/// weigh.
fn preliminary_score(items: &[EvidenceItem]) -> f64 {
    let total_weight: f64 = items.iter().map(|i| i.weight).sum();
    if total_weight <= 0.0 {
        return 0.5;
    }
    let weighted_sum: f64 = items
        .iter()
        .map(|i| i.weight * if i.supports_approval { 1.0 } else { 0.0 } * i.confidence)
        .sum();
    weighted_sum / total_weight
}

/// `0.4 · mean(confidence) + 0.4 · data_completeness + 0.2 · consensus_factor`,
/// capped at `0.95`; `0.1` when there's no evidence at all.
fn confidence_score(items: &[EvidenceItem], context: &AnalysisContext) -> f64 {
    if items.is_empty() {
        return 0.1;
    }

    let avg_confidence: f64 = items.iter().map(|i| i.confidence).sum::<f64>() / items.len() as f64;
    let data_completeness = context.data_completeness();

    let supporting = items.iter().filter(|i| i.supports_approval).count();
    let supporting_fraction = supporting as f64 / items.len() as f64;
    let consensus_factor = 1.0 - 2.0 * (0.5 - supporting_fraction).abs();

    (avg_confidence * 0.4 + data_completeness * 0.4 + consensus_factor * 0.2).min(0.95)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pa_contracts::drug::{DrugInformation, DrugSafetySummary, SafetyProfile};
    use pa_contracts::patient::PatientRecord;
    use pa_contracts::policy::{CoverageDecision, CriterionResult, Evaluation, Severity};

    fn full_context(criteria_met: bool) -> AnalysisContext {
        AnalysisContext {
            patient_id: "patient-001".into(),
            drug_name: "empagliflozin".into(),
            insurer_id: "uhc".into(),
            urgency: None,
            patient_record: Some(PatientRecord {
                patient_id: "patient-001".into(),
                age: 52,
                gender: "M".into(),
                diagnoses_icd10: vec!["E11.9".into()],
                medication_history: vec!["Metformin".into()],
                labs: [("HbA1c".to_string(), "8.5%".to_string())].into_iter().collect(),
                notes: vec![],
                provider_type: "Endocrinologist".into(),
                adherence_score: Some(0.9),
                requested_quantity: Some(30),
                created_at: Utc::now(),
                last_updated: Utc::now(),
            }),
            drug_info: Some(DrugInformation {
                canonical_name: "Empagliflozin".into(),
                drug_class: "SGLT2 inhibitor".into(),
                mechanism: String::new(),
                indications: vec!["type 2 diabetes".into()],
                contraindications: vec![],
                warnings: vec![],
                monitoring_requirements: vec![],
                dosing: Default::default(),
            }),
            policy: None,
            guidelines: vec![],
            drug_safety: Some(DrugSafetySummary {
                drug_class: "SGLT2 inhibitor".into(),
                warnings: vec![],
                contraindications: vec![],
                monitoring_requirements: vec![],
                safety_profile: SafetyProfile::Minimal,
            }),
            coverage_decision: Some(CoverageDecision {
                criteria_met,
                criterion_results: if criteria_met {
                    vec![]
                } else {
                    vec![CriterionResult {
                        criterion_id: "diagnosis".into(),
                        criterion_type: "diagnosis".into(),
                        severity: Severity::Critical,
                        required: true,
                        evaluation: Evaluation::Unmet { details: "missing diagnosis".into() },
                    }]
                },
                recommendations: vec![],
            }),
            interaction_check: Some(vec![]),
        }
    }

    #[test]
    fn met_criteria_with_supporting_evidence_scores_above_half() {
        let assessment = assess(&full_context(true));
        assert!(assessment.preliminary_score > 0.5);
        assert!(assessment.confidence_score > 0.0);
    }

    #[test]
    fn unmet_criteria_drags_score_down() {
        let met = assess(&full_context(true));
        let unmet = assess(&full_context(false));
        assert!(unmet.preliminary_score < met.preliminary_score);
    }

    #[test]
    fn no_weighable_evidence_falls_back_to_neutral_score() {
        assert_eq!(preliminary_score(&[]), 0.5);
    }

    #[test]
    fn no_evidence_falls_back_to_low_confidence() {
        let context = full_context(true);
        assert_eq!(confidence_score(&[], &context), 0.1);
    }
}
