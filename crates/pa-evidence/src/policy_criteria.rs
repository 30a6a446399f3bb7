//! Policy criteria evidence (§4.3): the main criteria-met item plus one
//! additional penalty item per unmet criterion, scaled by its severity.

use pa_contracts::evidence::{EvidenceItem, EvidenceType};
use pa_contracts::policy::{CoverageDecision, Evaluation};

pub fn policy_criteria_evidence(decision: &CoverageDecision, category_weight: f64) -> Vec<EvidenceItem> {
    let unmet_count = decision.criterion_results.iter().filter(|r| !r.evaluation.is_met()).count();
    let content = if decision.criteria_met {
        "insurance policy criteria met".to_string()
    } else {
        format!("insurance policy criteria not met: {unmet_count} criterion(s) outstanding")
    };

    let mut items = vec![EvidenceItem::new(
        "policy_analysis",
        EvidenceType::CriteriaCheck,
        content,
        category_weight,
        decision.criteria_met,
        0.95,
    )];

    for result in &decision.criterion_results {
        if let Evaluation::Unmet { details } = &result.evaluation {
            items.push(EvidenceItem::new(
                "policy_analysis",
                EvidenceType::CriteriaCheck,
                format!("unmet ({:?}, {}): {details}", result.severity, result.criterion_type),
                result.severity.penalty_weight(),
                false,
                0.9,
            ));
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_contracts::policy::{CriterionResult, Severity};

    fn decision(criteria_met: bool, results: Vec<CriterionResult>) -> CoverageDecision {
        CoverageDecision {
            criteria_met,
            criterion_results: results,
            recommendations: vec![],
        }
    }

    #[test]
    fn met_criteria_yields_single_supporting_item() {
        let evidence = policy_criteria_evidence(&decision(true, vec![]), 0.30);
        assert_eq!(evidence.len(), 1);
        assert!(evidence[0].supports_approval);
    }

    #[test]
    fn unmet_criterion_adds_penalty_item() {
        let results = vec![CriterionResult {
            criterion_id: "diagnosis".into(),
            criterion_type: "diagnosis".into(),
            severity: Severity::Critical,
            required: true,
            evaluation: Evaluation::Unmet { details: "missing diagnosis".into() },
        }];
        let evidence = policy_criteria_evidence(&decision(false, results), 0.30);
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[1].weight, 0.20);
        assert!(!evidence[1].supports_approval);
    }
}
