//! Alternative-drug enrichment (§4.5.2): up to 3 from `policy.alternatives`,
//! each annotated with a rationale, plus one cross-class suggestion if a
//! slot remains and the drug belongs to a class with a known fallback.

use pa_contracts::policy::AlternativeDrug;

const MAX_ALTERNATIVES: usize = 3;

/// Cross-class fallback suggestions keyed by drug class, consulted only
/// when fewer than `MAX_ALTERNATIVES` policy alternatives are available.
const CROSS_CLASS_FALLBACKS: [(&str, &str); 2] = [
    ("SGLT2 inhibitor", "GLP-1 receptor agonist"),
    ("GLP-1 receptor agonist", "SGLT2 inhibitor"),
];

fn rationale_for(alt: &AlternativeDrug) -> String {
    if alt.prior_auth_required {
        format!("{} is covered under this policy but still requires prior authorization", alt.drug_name)
    } else {
        format!("{} is covered under this policy without additional prior authorization", alt.drug_name)
    }
}

pub fn build_alternatives(raw_alternatives: &[AlternativeDrug], drug_class: Option<&str>) -> Vec<AlternativeDrug> {
    let mut enriched: Vec<AlternativeDrug> = raw_alternatives
        .iter()
        .take(MAX_ALTERNATIVES)
        .map(|alt| AlternativeDrug {
            drug_name: alt.drug_name.clone(),
            coverage_status: alt.coverage_status,
            tier: alt.tier,
            prior_auth_required: alt.coverage_status.requires_pa_review(),
            rationale: rationale_for(alt),
        })
        .collect();

    if enriched.len() < MAX_ALTERNATIVES {
        if let Some(class) = drug_class {
            if let Some((_, fallback_class)) = CROSS_CLASS_FALLBACKS.iter().find(|(c, _)| *c == class) {
                enriched.push(AlternativeDrug {
                    drug_name: format!("a {fallback_class}"),
                    coverage_status: alt_default_status(),
                    tier: None,
                    prior_auth_required: true,
                    rationale: format!("cross-class option worth discussing if {class} therapy is denied"),
                });
            }
        }
    }

    enriched
}

fn alt_default_status() -> pa_contracts::policy::CoverageStatus {
    pa_contracts::policy::CoverageStatus::CoveredWithPA
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_contracts::policy::CoverageStatus;

    fn raw(name: &str) -> AlternativeDrug {
        AlternativeDrug {
            drug_name: name.to_string(),
            coverage_status: CoverageStatus::CoveredWithRestrictions,
            tier: Some(2),
            prior_auth_required: false,
            rationale: String::new(),
        }
    }

    #[test]
    fn caps_at_three_and_enriches_rationale() {
        let raw_alts = vec![raw("a"), raw("b"), raw("c"), raw("d")];
        let enriched = build_alternatives(&raw_alts, None);
        assert_eq!(enriched.len(), 3);
        assert!(!enriched[0].rationale.is_empty());
    }

    #[test]
    fn appends_cross_class_fallback_when_slot_remains() {
        let raw_alts = vec![raw("dapagliflozin")];
        let enriched = build_alternatives(&raw_alts, Some("SGLT2 inhibitor"));
        assert_eq!(enriched.len(), 2);
        assert!(enriched[1].drug_name.contains("GLP-1"));
    }
}
