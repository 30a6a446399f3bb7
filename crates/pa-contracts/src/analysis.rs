//! The orchestrator's central snapshot (`AnalysisContext`) and its terminal
//! artifact (`AnalysisResult`) — §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drug::{DrugInformation, DrugSafetySummary};
use crate::evidence::EvidenceItem;
use crate::interaction::{InteractionResult, SeveritySummary};
use crate::patient::PatientRecord;
use crate::policy::{AlternativeDrug, CoverageDecision, InsurerPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineSnippet {
    /// Truncated to 150 characters when it enters an evidence item (§4.2.5).
    pub text: String,
    pub relevance_score: f64,
    pub source: String,
    pub year: u16,
}

/// Everything the orchestrator gathered for one PA request. Assembled once,
/// never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub patient_id: String,
    pub drug_name: String,
    pub insurer_id: String,
    pub urgency: Option<String>,
    pub patient_record: Option<PatientRecord>,
    pub drug_info: Option<DrugInformation>,
    pub policy: Option<InsurerPolicy>,
    pub guidelines: Vec<GuidelineSnippet>,
    pub drug_safety: Option<DrugSafetySummary>,
    pub coverage_decision: Option<CoverageDecision>,
    pub interaction_check: Option<Vec<InteractionResult>>,
}

impl AnalysisContext {
    /// Fraction of the seven context fields populated, used by the
    /// confidence score's `data_completeness` term (§4.3).
    pub fn data_completeness(&self) -> f64 {
        let fields: [bool; 7] = [
            self.patient_record.is_some(),
            self.drug_info.is_some(),
            self.policy.is_some(),
            !self.guidelines.is_empty(),
            self.drug_safety.is_some(),
            self.coverage_decision.is_some(),
            self.interaction_check.is_some(),
        ];
        fields.iter().filter(|p| **p).count() as f64 / fields.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Deny,
    Pend,
    UrgentReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            ConfidenceLevel::VeryHigh
        } else if score >= 0.65 {
            ConfidenceLevel::High
        } else if score >= 0.4 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: String,
    pub agent_id: String,
}

/// The final artifact returned by `predict_approval_likelihood` (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub decision_id: String,
    pub patient_id: String,
    pub drug_name: String,
    pub insurer_id: String,
    pub decision: Decision,
    pub approval_likelihood: f64,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub clinical_rationale: String,
    pub evidence_items: Vec<EvidenceItem>,
    pub identified_gaps: Vec<String>,
    pub recommendations: Vec<String>,
    pub alternative_options: Vec<AlternativeDrug>,
    pub processing_time_ms: u64,
    pub llm_tokens_used: u32,
    pub analysis_timestamp: DateTime<Utc>,
    pub audit_trail: Vec<AuditEntry>,
    /// `"cache"` when served from cache, `"live"` otherwise.
    pub source: String,
    pub cache_age_seconds: Option<u64>,
}

impl AnalysisResult {
    /// `decision_id = "PA_" + patient_id + "_" + drug_name + "_" + unix_seconds`
    /// (§3 lifecycle).
    pub fn build_decision_id(patient_id: &str, drug_name: &str, unix_seconds: i64) -> String {
        format!("PA_{patient_id}_{drug_name}_{unix_seconds}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_completeness_counts_populated_fields() {
        let ctx = AnalysisContext {
            patient_id: "p".into(),
            drug_name: "d".into(),
            insurer_id: "i".into(),
            urgency: None,
            patient_record: None,
            drug_info: None,
            policy: None,
            guidelines: vec![],
            drug_safety: None,
            coverage_decision: None,
            interaction_check: None,
        };
        assert_eq!(ctx.data_completeness(), 0.0);
    }

    #[test]
    fn confidence_level_bands() {
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_score(0.1), ConfidenceLevel::Low);
    }

    #[test]
    fn decision_id_format() {
        let id = AnalysisResult::build_decision_id("patient-001", "Empagliflozin", 1_700_000_000);
        assert_eq!(id, "PA_patient-001_Empagliflozin_1700000000");
    }
}
