//! Insurer policy and coverage criteria types (§3, §4.2.4).
//!
//! `CoverageStatus` is totally ordered by the hierarchy named in the data
//! model: `Excluded < NotCovered < NotOnFormulary < NonPreferred <
//! CoveredWithRestrictions < CoveredWithPA < Covered`. The derive order of
//! the enum variants below encodes exactly that hierarchy — `PartialOrd`/`Ord`
//! fall out of declaration order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Excluded,
    NotCovered,
    NotOnFormulary,
    NonPreferred,
    CoveredWithRestrictions,
    CoveredWithPA,
    Covered,
}

impl CoverageStatus {
    /// True for the two statuses that route through the criteria evaluator
    /// (§4.2.4 step 1).
    pub fn requires_pa_review(self) -> bool {
        matches!(
            self,
            CoverageStatus::CoveredWithPA | CoverageStatus::CoveredWithRestrictions
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Critical,
}

impl Severity {
    /// Per-criterion penalty weight added to evidence scoring for an unmet
    /// criterion of this severity (§4.3).
    pub fn penalty_weight(self) -> f64 {
        match self {
            Severity::Critical => 0.20,
            Severity::Moderate => 0.15,
            Severity::Minor => 0.10,
        }
    }
}

/// The six criterion kinds a policy may attach, plus the shared fields every
/// criterion carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub required: bool,
    pub kind: CriterionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CriterionKind {
    Diagnosis {
        required_codes: BTreeSet<String>,
    },
    StepTherapy {
        required_prior_drug: String,
        duration_days: Option<u32>,
    },
    LabValue {
        test_name: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    AgeLimit {
        min: Option<u8>,
        max: Option<u8>,
    },
    QuantityLimit {
        max_units_per_fill: u32,
    },
    ProviderType {
        allowed: BTreeSet<String>,
    },
}

impl CriterionKind {
    /// Short type tag used in evidence items and test assertions, e.g.
    /// `"step_therapy"`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            CriterionKind::Diagnosis { .. } => "diagnosis",
            CriterionKind::StepTherapy { .. } => "step_therapy",
            CriterionKind::LabValue { .. } => "lab_value",
            CriterionKind::AgeLimit { .. } => "age_limit",
            CriterionKind::QuantityLimit { .. } => "quantity_limit",
            CriterionKind::ProviderType { .. } => "provider_type",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeDrug {
    pub drug_name: String,
    pub coverage_status: CoverageStatus,
    pub tier: Option<u8>,
    pub prior_auth_required: bool,
    /// Why this alternative is being surfaced; empty until the orchestrator
    /// enriches raw policy alternatives for a result (§4.5.2).
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurerPolicy {
    pub insurer: String,
    pub drug_name: String,
    pub policy_version: String,
    pub coverage_status: CoverageStatus,
    /// 1-5, or `None` if unknown.
    pub tier: Option<u8>,
    pub monthly_cost: f64,
    pub criteria: Vec<Criterion>,
    pub quantity_limit_units_per_fill: Option<u32>,
    pub alternatives: Vec<AlternativeDrug>,
}

/// Outcome of evaluating a single criterion against patient evidence (§9:
/// tagged variant replacing exception-for-control-flow).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Evaluation {
    Met { details: String },
    Unmet { details: String },
    Unparseable { reason: String },
}

impl Evaluation {
    pub fn is_met(&self) -> bool {
        matches!(self, Evaluation::Met { .. })
    }

    pub fn details(&self) -> &str {
        match self {
            Evaluation::Met { details } | Evaluation::Unmet { details } => details,
            Evaluation::Unparseable { reason } => reason,
        }
    }
}

/// A single criterion paired with its evaluation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion_id: String,
    pub criterion_type: String,
    pub severity: Severity,
    pub required: bool,
    pub evaluation: Evaluation,
}

/// The result of `PolicyService::check_coverage` (§4.2.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageDecision {
    pub criteria_met: bool,
    pub criterion_results: Vec<CriterionResult>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_status_requires_pa_review() {
        assert!(CoverageStatus::CoveredWithPA.requires_pa_review());
        assert!(CoverageStatus::CoveredWithRestrictions.requires_pa_review());
        assert!(!CoverageStatus::Covered.requires_pa_review());
        assert!(!CoverageStatus::Excluded.requires_pa_review());
    }

    #[test]
    fn criterion_kind_type_tags() {
        let k = CriterionKind::QuantityLimit {
            max_units_per_fill: 30,
        };
        assert_eq!(k.type_tag(), "quantity_limit");
    }

    #[test]
    fn severity_penalty_weights() {
        assert_eq!(Severity::Critical.penalty_weight(), 0.20);
        assert_eq!(Severity::Moderate.penalty_weight(), 0.15);
        assert_eq!(Severity::Minor.penalty_weight(), 0.10);
    }
}
