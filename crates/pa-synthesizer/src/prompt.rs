//! Prompt construction (§4.4): the advanced prompt carries the full case
//! picture; the simplified prompt is the token-guard fallback.

use pa_contracts::analysis::AnalysisContext;
use pa_contracts::evidence::EvidenceItem;

pub const MAX_PROMPT_TOKENS: f64 = 4000.0;
const TOKENS_PER_WORD: f64 = 1.3;
const TOP_EVIDENCE_ITEMS: usize = 3;
const TOP_GUIDELINES: usize = 3;

pub fn estimate_tokens(prompt: &str) -> f64 {
    prompt.split_whitespace().count() as f64 * TOKENS_PER_WORD
}

fn format_patient_profile(context: &AnalysisContext) -> String {
    match &context.patient_record {
        Some(patient) => format!(
            "Age {}, {}. Diagnoses: {}. Medications: {}. Provider: {}.",
            patient.age,
            patient.gender,
            patient.diagnoses_icd10.join(", "),
            patient.medication_history.join(", "),
            patient.provider_type,
        ),
        None => "No patient record available".to_string(),
    }
}

fn format_drug_info(context: &AnalysisContext) -> String {
    match &context.drug_info {
        Some(drug) => format!("{} ({}). Indications: {}.", drug.canonical_name, drug.drug_class, drug.indications.join(", ")),
        None => "No drug information available".to_string(),
    }
}

fn format_policy_info(context: &AnalysisContext) -> String {
    match &context.policy {
        Some(policy) => format!("{:?}, tier {:?}, PA review required: {}", policy.coverage_status, policy.tier, policy.coverage_status.requires_pa_review()),
        None => "No policy information available".to_string(),
    }
}

fn format_evidence_by_type(evidence: &[EvidenceItem]) -> String {
    let mut lines = Vec::new();
    for item in evidence {
        lines.push(format!(
            "- [{}] {} ({}, confidence {:.2})",
            item.evidence_type.as_str(),
            item.content,
            if item.supports_approval { "supports" } else { "opposes" },
            item.confidence
        ));
    }
    lines.join("\n")
}

fn format_safety_assessment(context: &AnalysisContext) -> String {
    match &context.drug_safety {
        Some(safety) => format!("{:?}. Warnings: {}. Contraindications: {}.", safety.safety_profile, safety.warnings.len(), safety.contraindications.len()),
        None => "No safety assessment available".to_string(),
    }
}

fn format_guidelines(context: &AnalysisContext) -> String {
    context
        .guidelines
        .iter()
        .take(TOP_GUIDELINES)
        .map(|g| format!("- ({}, relevance {:.2}) {}", g.source, g.relevance_score, g.text))
        .collect::<Vec<_>>()
        .join("\n")
}

const REQUIRED_JSON_SCHEMA_NOTE: &str = concat!(
    "Respond with a single JSON object with keys: ",
    "approval_likelihood_percent (0-100), decision_prediction (Approve, Deny, or \"Pend for More Info\"), ",
    "confidence_score (0-1), clinical_rationale (non-empty string), ",
    "key_supporting_factors, key_opposing_factors, identified_gaps, recommended_next_steps (arrays of strings).",
);

/// Full-context prompt: case id, urgency, preliminary score, formatted
/// patient/drug/policy/evidence/safety/guidelines, and the schema note.
pub fn build_advanced_prompt(
    case_id: &str,
    context: &AnalysisContext,
    evidence: &[EvidenceItem],
    preliminary_score: f64,
    confidence: f64,
    urgency: Option<&str>,
) -> String {
    format!(
        "Case ID: {case_id}\n\
         Urgency: {}\n\
         Preliminary Score: {:.1}%\n\
         Confidence: {:.2}\n\n\
         Patient profile: {}\n\n\
         Drug: {}\n\n\
         Policy: {}\n\n\
         Evidence:\n{}\n\n\
         Safety assessment: {}\n\n\
         Guidelines:\n{}\n\n\
         {REQUIRED_JSON_SCHEMA_NOTE}",
        urgency.unwrap_or("routine"),
        preliminary_score * 100.0,
        confidence,
        format_patient_profile(context),
        format_drug_info(context),
        format_policy_info(context),
        format_evidence_by_type(evidence),
        format_safety_assessment(context),
        format_guidelines(context),
    )
}

/// Condensed prompt used when the advanced prompt would exceed
/// `MAX_PROMPT_TOKENS`, or directly as the fallback-tier prompt: top 3
/// supporting and top 3 opposing evidence items only.
pub fn build_simplified_prompt(case_id: &str, preliminary_score: f64, evidence: &[EvidenceItem]) -> String {
    let supporting: Vec<&EvidenceItem> = evidence.iter().filter(|e| e.supports_approval).take(TOP_EVIDENCE_ITEMS).collect();
    let opposing: Vec<&EvidenceItem> = evidence.iter().filter(|e| !e.supports_approval).take(TOP_EVIDENCE_ITEMS).collect();

    let supporting_text = supporting.iter().map(|e| format!("- {}", e.content)).collect::<Vec<_>>().join("\n");
    let opposing_text = opposing.iter().map(|e| format!("- {}", e.content)).collect::<Vec<_>>().join("\n");

    format!(
        "Case ID: {case_id}\n\
         Preliminary Score: {:.1}%\n\n\
         Top supporting factors:\n{supporting_text}\n\n\
         Top opposing factors:\n{opposing_text}\n\n\
         {REQUIRED_JSON_SCHEMA_NOTE}",
        preliminary_score * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pa_contracts::evidence::EvidenceType;

    fn empty_context() -> AnalysisContext {
        AnalysisContext {
            patient_id: "patient-001".into(),
            drug_name: "empagliflozin".into(),
            insurer_id: "uhc".into(),
            urgency: None,
            patient_record: None,
            drug_info: None,
            policy: None,
            guidelines: vec![],
            drug_safety: None,
            coverage_decision: None,
            interaction_check: None,
        }
    }

    #[test]
    fn advanced_prompt_embeds_preliminary_score() {
        let prompt = build_advanced_prompt("PA_1", &empty_context(), &[], 0.82, 0.7, Some("urgent"));
        assert!(prompt.contains("Preliminary Score: 82.0%"));
        assert!(prompt.contains("Urgency: urgent"));
    }

    #[test]
    fn simplified_prompt_only_carries_top_evidence() {
        let _ = Utc::now();
        let evidence = vec![
            pa_contracts::evidence::EvidenceItem::new("a", EvidenceType::GuidelineSupport, "supports one", 0.1, true, 0.8),
            pa_contracts::evidence::EvidenceItem::new("b", EvidenceType::DrugSafety, "opposes one", 0.1, false, 0.8),
        ];
        let prompt = build_simplified_prompt("PA_1", 0.5, &evidence);
        assert!(prompt.contains("supports one"));
        assert!(prompt.contains("opposes one"));
    }

    #[test]
    fn estimate_tokens_scales_with_word_count() {
        let prompt = "one two three four five";
        assert!((estimate_tokens(prompt) - 6.5).abs() < 1e-9);
    }
}
