//! The deterministic coverage criteria evaluator (§4.2.4).
//!
//! Evaluation algorithm:
//!
//! 1. If the policy's coverage status does not require PA review, return
//!    `criteria_met = true` immediately with a recommendation stating no PA
//!    is needed.
//! 2. Otherwise evaluate every `Criterion` via its handler, plus a synthetic
//!    `quantity_limit` criterion when the policy carries one at the top
//!    level.
//! 3. `criteria_met` is true iff no criterion that is both `required` and
//!    `severity = critical` is unmet. Required moderate/minor criteria are
//!    recorded but never block.
//! 4. Emit one deterministic recommendation per unmet criterion.

use tracing::debug;

use pa_contracts::patient::PatientRecord;
use pa_contracts::policy::{
    Criterion, CriterionKind, CriterionResult, CoverageDecision, Evaluation, InsurerPolicy, Severity,
};

use crate::handlers;

#[derive(Debug, Default)]
pub struct CriteriaEngine;

impl CriteriaEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn check_coverage(&self, policy: &InsurerPolicy, patient: &PatientRecord) -> CoverageDecision {
        if !policy.coverage_status.requires_pa_review() {
            debug!(drug = %policy.drug_name, "coverage status does not require PA review");
            return CoverageDecision {
                criteria_met: true,
                criterion_results: vec![],
                recommendations: vec![format!(
                    "no prior authorization is required for {} under the current coverage status",
                    policy.drug_name
                )],
            };
        }

        let mut criteria: Vec<Criterion> = policy.criteria.clone();
        if let Some(max_units) = policy.quantity_limit_units_per_fill {
            criteria.push(Criterion {
                id: "quantity-limit-synthetic".to_string(),
                description: format!("quantity limited to {max_units} units per fill"),
                severity: Severity::Moderate,
                required: true,
                kind: CriterionKind::QuantityLimit {
                    max_units_per_fill: max_units,
                },
            });
        }

        let mut results = Vec::with_capacity(criteria.len());
        let mut recommendations = Vec::new();
        let mut blocking_unmet = false;

        for criterion in &criteria {
            let evaluation = handlers::evaluate(&criterion.kind, patient);
            let met = evaluation.is_met();

            if !met {
                if criterion.required && criterion.severity == Severity::Critical {
                    blocking_unmet = true;
                }
                recommendations.push(recommendation_for(criterion, &evaluation));
            }

            results.push(CriterionResult {
                criterion_id: criterion.id.clone(),
                criterion_type: criterion.kind.type_tag().to_string(),
                severity: criterion.severity,
                required: criterion.required,
                evaluation,
            });
        }

        CoverageDecision {
            criteria_met: !blocking_unmet,
            criterion_results: results,
            recommendations,
        }
    }
}

/// Deterministic, criterion-kind-specific remediation text for an unmet
/// criterion (§4.2.4 step 5).
fn recommendation_for(criterion: &Criterion, evaluation: &Evaluation) -> String {
    match &criterion.kind {
        CriterionKind::StepTherapy {
            required_prior_drug,
            duration_days,
        } => match duration_days {
            Some(days) => format!("trial of {required_prior_drug} for {days} days required"),
            None => format!("trial of {required_prior_drug} required"),
        },
        CriterionKind::Diagnosis { required_codes } => format!(
            "documentation of one of the following diagnoses is required: {}",
            required_codes
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ),
        CriterionKind::LabValue { test_name, .. } => {
            format!("updated {test_name} lab value is required: {}", evaluation.details())
        }
        CriterionKind::AgeLimit { .. } => format!(
            "patient age does not meet policy requirement: {}",
            evaluation.details()
        ),
        CriterionKind::QuantityLimit { max_units_per_fill } => format!(
            "requested quantity exceeds the {max_units_per_fill}-unit-per-fill limit; reduce quantity or request an exception"
        ),
        CriterionKind::ProviderType { allowed } => format!(
            "prescription must originate from one of: {}",
            allowed.iter().cloned().collect::<Vec<_>>().join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pa_contracts::policy::CoverageStatus;
    use std::collections::BTreeSet;

    fn patient(requested_quantity: Option<u32>) -> PatientRecord {
        PatientRecord {
            patient_id: "patient-002".into(),
            age: 35,
            gender: "F".into(),
            diagnoses_icd10: vec!["E11.9".into()],
            medication_history: vec![],
            labs: [("HbA1c".to_string(), "7.8%".to_string())].into_iter().collect(),
            notes: vec![],
            provider_type: "Primary Care".into(),
            adherence_score: None,
            requested_quantity,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    fn policy_with(criteria: Vec<Criterion>, quantity_limit: Option<u32>) -> InsurerPolicy {
        InsurerPolicy {
            insurer: "UHC".into(),
            drug_name: "Empagliflozin".into(),
            policy_version: "2026.1".into(),
            coverage_status: CoverageStatus::CoveredWithPA,
            tier: Some(3),
            monthly_cost: 450.0,
            criteria,
            quantity_limit_units_per_fill: quantity_limit,
            alternatives: vec![],
        }
    }

    #[test]
    fn coverage_not_requiring_pa_is_met_without_evaluating_criteria() {
        let mut policy = policy_with(vec![], None);
        policy.coverage_status = CoverageStatus::Covered;
        let decision = CriteriaEngine::new().check_coverage(&policy, &patient(None));
        assert!(decision.criteria_met);
        assert!(decision.criterion_results.is_empty());
    }

    #[test]
    fn critical_unmet_step_therapy_blocks_approval() {
        let policy = policy_with(
            vec![Criterion {
                id: "step-1".into(),
                description: "step therapy".into(),
                severity: Severity::Critical,
                required: true,
                kind: CriterionKind::StepTherapy {
                    required_prior_drug: "metformin".into(),
                    duration_days: None,
                },
            }],
            None,
        );
        let decision = CriteriaEngine::new().check_coverage(&policy, &patient(None));
        assert!(!decision.criteria_met);
        assert_eq!(decision.recommendations.len(), 1);
        assert!(decision.recommendations[0].contains("metformin"));
    }

    #[test]
    fn moderate_unmet_criterion_does_not_block() {
        let policy = policy_with(
            vec![Criterion {
                id: "lab-1".into(),
                description: "lab check".into(),
                severity: Severity::Moderate,
                required: true,
                kind: CriterionKind::LabValue {
                    test_name: "eGFR".into(),
                    min: Some(30.0),
                    max: None,
                },
            }],
            None,
        );
        let decision = CriteriaEngine::new().check_coverage(&policy, &patient(None));
        assert!(decision.criteria_met);
        assert_eq!(decision.recommendations.len(), 1);
    }

    #[test]
    fn quantity_limit_synthesized_from_top_level_field() {
        let policy = policy_with(vec![], Some(30));
        let decision = CriteriaEngine::new().check_coverage(&policy, &patient(Some(60)));
        let names: BTreeSet<&str> = decision
            .criterion_results
            .iter()
            .map(|r| r.criterion_type.as_str())
            .collect();
        assert!(names.contains("quantity_limit"));
        assert!(decision.recommendations.iter().any(|r| r.contains("30")));
    }
}
