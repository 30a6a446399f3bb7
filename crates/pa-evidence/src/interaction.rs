//! Drug-interaction evidence (§4.3): a single aggregate item covering the
//! whole interaction check.

use pa_contracts::evidence::{EvidenceItem, EvidenceType};
use pa_contracts::interaction::{InteractionResult, InteractionSeverity};

pub fn interaction_evidence(results: &[InteractionResult], category_weight: f64) -> EvidenceItem {
    let highest = results.iter().map(|r| r.severity).max().unwrap_or(InteractionSeverity::None);
    let severity_score = highest.severity_score();

    let (content, confidence) = if results.is_empty() {
        ("no significant drug interactions identified".to_string(), 0.9)
    } else {
        let count = results.len();
        let plural = if count > 1 { "s" } else { "" };
        (
            format!(
                "{count} drug interaction{plural} detected with {} severity",
                tag(highest)
            ),
            0.85,
        )
    };

    let supports = severity_score < 0.5;

    EvidenceItem::new("drug_interaction_analysis", EvidenceType::DrugInteractions, content, category_weight, supports, confidence)
}

fn tag(severity: InteractionSeverity) -> &'static str {
    match severity {
        InteractionSeverity::None => "none",
        InteractionSeverity::Unknown => "unknown",
        InteractionSeverity::Minor => "minor",
        InteractionSeverity::Moderate => "moderate",
        InteractionSeverity::Major => "major",
        InteractionSeverity::Contraindicated => "contraindicated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_contracts::interaction::DrugPair;

    fn result(severity: InteractionSeverity) -> InteractionResult {
        InteractionResult {
            drugs: DrugPair::new("a", "b"),
            severity,
            description: String::new(),
            management: String::new(),
        }
    }

    #[test]
    fn no_interactions_supports_with_high_confidence() {
        let evidence = interaction_evidence(&[], 0.10);
        assert!(evidence.supports_approval);
        assert_eq!(evidence.confidence, 0.9);
    }

    #[test]
    fn major_severity_opposes_approval() {
        let evidence = interaction_evidence(&[result(InteractionSeverity::Major)], 0.10);
        assert!(!evidence.supports_approval);
    }

    #[test]
    fn minor_severity_supports_approval() {
        let evidence = interaction_evidence(&[result(InteractionSeverity::Minor)], 0.10);
        assert!(evidence.supports_approval);
    }
}
