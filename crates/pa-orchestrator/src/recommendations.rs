//! Recommendation text assembly (§4.5.1). Capped at 5 items regardless of
//! decision outcome.

use pa_contracts::analysis::Decision;
use pa_contracts::drug::DrugInformation;
use pa_contracts::patient::PatientRecord;
use pa_contracts::policy::{AlternativeDrug, CoverageDecision, CriterionResult, Evaluation};

const MAX_RECOMMENDATIONS: usize = 5;
const MAX_MONITORING_ITEMS: usize = 3;
const MAX_DENIAL_ALTERNATIVES: usize = 2;

fn unmet_criteria(decision: &CoverageDecision) -> Vec<&CriterionResult> {
    decision.criterion_results.iter().filter(|r| !r.evaluation.is_met()).collect()
}

fn remediation_for(result: &CriterionResult) -> Option<String> {
    let details = result.evaluation.details();
    match result.criterion_type.as_str() {
        "step_therapy" => Some(format!(
            "document a trial of the required prior therapy before resubmitting ({details})"
        )),
        "diagnosis" => Some(format!(
            "submit documentation establishing a qualifying diagnosis ({details})"
        )),
        "lab_value" => Some(format!("submit current lab results supporting medical necessity ({details})")),
        "quantity_limit" => Some(format!("request a quantity within the policy limit ({details})")),
        "age_limit" => Some(format!("confirm patient age meets policy requirements ({details})")),
        "provider_type" => Some(format!("resubmit from an allowed prescriber type ({details})")),
        _ => None,
    }
}

fn approval_recommendations(drug_info: Option<&DrugInformation>) -> Vec<String> {
    let mut recs = vec!["initiate therapy per the approved prescription and counsel the patient on administration".to_string()];

    if let Some(drug) = drug_info {
        recs.extend(drug.monitoring_requirements.iter().take(MAX_MONITORING_ITEMS).cloned());
        if let Some(dose) = drug.dosing.get(pa_contracts::drug::DOSING_INITIAL) {
            recs.push(format!("starting dose guidance: {dose}"));
        }
    }

    recs
}

fn denial_recommendations(decision: &CoverageDecision, alternatives: &[AlternativeDrug]) -> Vec<String> {
    let mut recs: Vec<String> = unmet_criteria(decision).into_iter().filter_map(remediation_for).collect();

    for alt in alternatives.iter().take(MAX_DENIAL_ALTERNATIVES) {
        recs.push(format!("consider {} as a covered alternative", alt.drug_name));
    }

    recs
}

fn pend_recommendations(decision: &CoverageDecision, patient: Option<&PatientRecord>) -> Vec<String> {
    let mut recs: Vec<String> = unmet_criteria(decision)
        .into_iter()
        .filter_map(|r| match &r.evaluation {
            Evaluation::Unparseable { reason } => Some(format!("clarify and resubmit: {reason}")),
            _ => remediation_for(r),
        })
        .collect();

    if recs.is_empty() {
        if patient.map(|p| p.labs.is_empty()).unwrap_or(true) {
            recs.push("submit current lab results to support the request".to_string());
        }
        if patient.map(|p| p.notes.is_empty()).unwrap_or(true) {
            recs.push("submit clinical notes documenting the treatment rationale".to_string());
        }
    }

    recs
}

pub fn build_recommendations(
    decision: Decision,
    coverage_decision: Option<&CoverageDecision>,
    patient: Option<&PatientRecord>,
    drug_info: Option<&DrugInformation>,
    alternatives: &[AlternativeDrug],
) -> Vec<String> {
    let mut recs = match decision {
        Decision::Approve => approval_recommendations(drug_info),
        Decision::Deny => coverage_decision
            .map(|d| denial_recommendations(d, alternatives))
            .unwrap_or_default(),
        Decision::Pend | Decision::UrgentReview => coverage_decision
            .map(|d| pend_recommendations(d, patient))
            .unwrap_or_default(),
    };

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_contracts::policy::Severity;

    fn unmet(criterion_type: &str, details: &str) -> CriterionResult {
        CriterionResult {
            criterion_id: "c1".into(),
            criterion_type: criterion_type.into(),
            severity: Severity::Critical,
            required: true,
            evaluation: Evaluation::Unmet { details: details.into() },
        }
    }

    #[test]
    fn denial_recommendations_cite_step_therapy() {
        let decision = CoverageDecision {
            criteria_met: false,
            criterion_results: vec![unmet("step_therapy", "metformin trial missing")],
            recommendations: vec![],
        };
        let recs = build_recommendations(Decision::Deny, Some(&decision), None, None, &[]);
        assert!(recs[0].contains("prior therapy"));
    }

    #[test]
    fn recommendations_are_capped_at_five() {
        let results: Vec<CriterionResult> = (0..10).map(|i| unmet("diagnosis", &format!("reason {i}"))).collect();
        let decision = CoverageDecision {
            criteria_met: false,
            criterion_results: results,
            recommendations: vec![],
        };
        let recs = build_recommendations(Decision::Deny, Some(&decision), None, None, &[]);
        assert!(recs.len() <= 5);
    }
}
