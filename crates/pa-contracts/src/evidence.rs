//! Evidence item types produced by the Evidence Engine (§3, §4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The evidence categories named in the §4.3 weight schedule, plus
/// `criteria_check` for individual per-criterion items (policy_criteria_met
/// is the category; each criterion contributes one `criteria_check` item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    CriteriaCheck,
    GuidelineSupport,
    ClinicalAppropriateness,
    DrugInteractions,
    DrugSafety,
    PatientHistory,
}

impl EvidenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceType::CriteriaCheck => "criteria_check",
            EvidenceType::GuidelineSupport => "guideline_support",
            EvidenceType::ClinicalAppropriateness => "clinical_appropriateness",
            EvidenceType::DrugInteractions => "drug_interactions",
            EvidenceType::DrugSafety => "drug_safety",
            EvidenceType::PatientHistory => "patient_history",
        }
    }
}

/// A single, immutable piece of evidence feeding the preliminary score.
///
/// `weight` and `confidence` are clamped into `[0, 1]` at construction — this
/// is an invariant of the type, not something callers must remember to check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub source: String,
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,
    pub content: String,
    pub weight: f64,
    pub supports_approval: bool,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

const MAX_CONTENT_CHARS: usize = 200;

impl EvidenceItem {
    pub fn new(
        source: impl Into<String>,
        evidence_type: EvidenceType,
        content: impl Into<String>,
        weight: f64,
        supports_approval: bool,
        confidence: f64,
    ) -> Self {
        let content: String = content.into();
        let content = if content.chars().count() > MAX_CONTENT_CHARS {
            content.chars().take(MAX_CONTENT_CHARS).collect()
        } else {
            content
        };
        Self {
            source: source.into(),
            evidence_type,
            content,
            weight: weight.clamp(0.0, 1.0),
            supports_approval,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        }
    }
}
