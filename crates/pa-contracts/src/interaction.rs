//! Drug-drug interaction types (§3, §4.2.3). `InteractionSeverity` is
//! totally ordered by the integer level named in the spec:
//! `none=0, unknown=1, minor=2, moderate=3, major=4, contraindicated=5`
//! — again, declaration order carries the ordering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSeverity {
    None,
    Unknown,
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl InteractionSeverity {
    /// Numeric score used by the evidence engine's support/oppose rule
    /// (§4.3): `{contraindicated:1.0, major:0.8, moderate:0.5, minor:0.2, none:0}`.
    /// `unknown` is treated like `none` for scoring purposes since it carries
    /// no directional signal.
    pub fn severity_score(self) -> f64 {
        match self {
            InteractionSeverity::Contraindicated => 1.0,
            InteractionSeverity::Major => 0.8,
            InteractionSeverity::Moderate => 0.5,
            InteractionSeverity::Minor => 0.2,
            InteractionSeverity::Unknown | InteractionSeverity::None => 0.0,
        }
    }
}

/// Two drug names stored in sorted (lexicographic) order so interaction
/// results are order-independent of the caller's query order (§8 scenario 5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugPair(pub String, pub String);

impl DrugPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let mut a = a.into();
        let mut b = b.into();
        if b < a {
            std::mem::swap(&mut a, &mut b);
        }
        Self(a, b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResult {
    pub drugs: DrugPair,
    pub severity: InteractionSeverity,
    pub description: String,
    pub management: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub highest_severity: InteractionSeverity,
    pub clinical_significance: String,
}

impl SeveritySummary {
    pub fn from_results(results: &[InteractionResult]) -> Self {
        let highest = results
            .iter()
            .map(|r| r.severity)
            .max()
            .unwrap_or(InteractionSeverity::None);
        let clinical_significance = match highest {
            InteractionSeverity::Contraindicated => {
                "contraindicated — do not co-administer".to_string()
            }
            InteractionSeverity::Major => "major — avoid combination if possible".to_string(),
            InteractionSeverity::Moderate => "moderate — monitor closely".to_string(),
            InteractionSeverity::Minor => "minor — generally safe with monitoring".to_string(),
            InteractionSeverity::Unknown => "unknown — insufficient data".to_string(),
            InteractionSeverity::None => "no known interaction".to_string(),
        };
        Self {
            highest_severity: highest,
            clinical_significance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drug_pair_is_order_independent() {
        assert_eq!(
            DrugPair::new("warfarin", "aspirin"),
            DrugPair::new("aspirin", "warfarin")
        );
        assert_eq!(DrugPair::new("aspirin", "warfarin").0, "aspirin");
    }

    #[test]
    fn severity_orders_per_spec() {
        assert!(InteractionSeverity::Contraindicated > InteractionSeverity::Major);
        assert!(InteractionSeverity::Major > InteractionSeverity::Moderate);
        assert!(InteractionSeverity::Moderate > InteractionSeverity::Minor);
        assert!(InteractionSeverity::Minor > InteractionSeverity::Unknown);
        assert!(InteractionSeverity::Unknown > InteractionSeverity::None);
    }

    #[test]
    fn summary_picks_highest_severity() {
        let results = vec![
            InteractionResult {
                drugs: DrugPair::new("a", "b"),
                severity: InteractionSeverity::Minor,
                description: String::new(),
                management: String::new(),
            },
            InteractionResult {
                drugs: DrugPair::new("c", "d"),
                severity: InteractionSeverity::Major,
                description: String::new(),
                management: String::new(),
            },
        ];
        let summary = SeveritySummary::from_results(&results);
        assert_eq!(summary.highest_severity, InteractionSeverity::Major);
    }
}
