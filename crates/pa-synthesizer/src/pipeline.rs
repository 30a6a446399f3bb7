//! Primary -> fallback -> rule-based degradation (§4.4).
//!
//! `SynthesizerPipeline::run` is the rich entry point: it owns prompt
//! construction, the retry/backoff loop, continuation handling for
//! truncated responses, output verification, and the final rule-based
//! safety net. `SynthesizerPipeline` also implements the narrower
//! `pa_core::traits::Synthesizer` contract for callers that only have a
//! pre-built prompt and a preliminary score.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use pa_contracts::analysis::AnalysisContext;
use pa_contracts::error::{PaError, PaResult};
use pa_contracts::evidence::EvidenceItem;
use pa_core::traits::{Synthesizer, SynthesizedDecision};
use pa_verify::engine::{decision_output_schema, rationale_non_empty_rule, SchemaVerifier};

use crate::incompleteness::is_incomplete;
use crate::mock::{MockLlmClient, ModelTier};
use crate::prompt::{build_advanced_prompt, build_simplified_prompt, estimate_tokens, MAX_PROMPT_TOKENS};

const MAX_RETRIES: u32 = 3;

pub struct SynthesizerPipeline {
    primary: MockLlmClient,
    fallback: MockLlmClient,
    verifier: SchemaVerifier,
}

impl SynthesizerPipeline {
    pub fn new() -> Self {
        let mut verifier = SchemaVerifier::new();
        verifier.register_rule("rationale_non_empty", rationale_non_empty_rule());
        Self {
            primary: MockLlmClient::new(ModelTier::Primary),
            fallback: MockLlmClient::new(ModelTier::Fallback),
            verifier,
        }
    }

    /// Call `client` up to `MAX_RETRIES` times with `2^attempt` second
    /// exponential backoff between attempts. Returns the first response
    /// that is neither incomplete nor fails schema verification.
    async fn try_client(&self, client: &MockLlmClient, prompt: &str) -> Option<Value> {
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let backoff = Duration::from_secs(2u64.pow(attempt));
                tokio::time::sleep(backoff).await;
            }

            let mut response = client.respond(prompt);
            let rationale = response
                .get("clinical_rationale")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            if is_incomplete(&rationale) {
                warn!(attempt, tier = client.tier.as_str(), "incomplete response, requesting continuation");
                let continuation = client.respond(prompt);
                let continued_rationale = continuation
                    .get("clinical_rationale")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                response["clinical_rationale"] =
                    Value::String(crate::incompleteness::join_continuation(&rationale, continued_rationale));
            }

            let report = self.verifier.verify(&response, &decision_output_schema());
            if report.passed {
                return Some(response);
            }

            warn!(attempt, tier = client.tier.as_str(), failures = ?report.failures, "candidate failed verification");
        }
        None
    }

    /// Score>0.75 -> Approve; score<0.25 -> Deny; else Pend, fixed
    /// confidence 0.5, rationale naming the supporting/opposing item counts.
    fn rule_based_decision(&self, preliminary_score: f64, evidence: &[EvidenceItem]) -> Value {
        let supporting = evidence.iter().filter(|e| e.supports_approval).count();
        let opposing = evidence.len() - supporting;

        let (decision, likelihood) = if preliminary_score > 0.75 {
            ("Approve", (preliminary_score * 100.0).round())
        } else if preliminary_score < 0.25 {
            ("Deny", (preliminary_score * 100.0).round())
        } else {
            ("Pend for More Info", 50.0)
        };

        serde_json::json!({
            "approval_likelihood_percent": likelihood,
            "decision_prediction": decision,
            "confidence_score": 0.5,
            "clinical_rationale": format!(
                "Rule-based fallback decision: {supporting} supporting and {opposing} opposing evidence item(s) considered."
            ),
            "key_supporting_factors": [],
            "key_opposing_factors": [],
            "identified_gaps": ["LLM synthesis unavailable; decision derived from rule-based fallback".to_string()],
            "recommended_next_steps": [],
            "model_tier": "rule-based",
        })
    }

    /// Full pipeline: build the advanced prompt (or the simplified prompt if
    /// it would exceed `MAX_PROMPT_TOKENS`), try the primary client, fall
    /// back to the fallback client, and fall back again to a deterministic
    /// rule-based decision if both clients fail verification.
    pub async fn run(
        &self,
        case_id: &str,
        context: &AnalysisContext,
        evidence: &[EvidenceItem],
        preliminary_score: f64,
        confidence: f64,
    ) -> PaResult<SynthesizedDecision> {
        let advanced = build_advanced_prompt(case_id, context, evidence, preliminary_score, confidence, context.urgency.as_deref());
        let prompt = if estimate_tokens(&advanced) > MAX_PROMPT_TOKENS {
            info!(case_id, "advanced prompt exceeds token budget, using simplified prompt");
            build_simplified_prompt(case_id, preliminary_score, evidence)
        } else {
            advanced
        };

        let candidate = if let Some(response) = self.try_client(&self.primary, &prompt).await {
            response
        } else if let Some(response) = self.try_client(&self.fallback, &prompt).await {
            response
        } else {
            warn!(case_id, "both primary and fallback synthesis failed verification, using rule-based fallback");
            self.rule_based_decision(preliminary_score, evidence)
        };

        payload_to_decision(candidate)
    }
}

impl Default for SynthesizerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn payload_to_decision(payload: Value) -> PaResult<SynthesizedDecision> {
    let get_f64 = |key: &str| payload.get(key).and_then(Value::as_f64).unwrap_or_default();
    let get_str = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    };
    let get_u32 = |key: &str| payload.get(key).and_then(Value::as_u64).unwrap_or_default() as u32;

    let decision_prediction = get_str("decision_prediction");
    if decision_prediction.is_empty() {
        return Err(PaError::VerificationFailed {
            reason: "synthesizer payload is missing decision_prediction".to_string(),
        });
    }

    Ok(SynthesizedDecision {
        approval_likelihood_percent: get_f64("approval_likelihood_percent"),
        decision_prediction,
        confidence_score: get_f64("confidence_score"),
        clinical_rationale: get_str("clinical_rationale"),
        model_tier: get_str("model_tier"),
        tokens_used: get_u32("tokens_used"),
    })
}

/// Thin adapter for the fixed `pa_core::traits::Synthesizer` contract: a
/// caller that has only a pre-built prompt and a preliminary score gets the
/// same primary -> fallback -> rule-based degradation, minus the
/// context-aware prompt construction `run` performs.
#[async_trait]
impl Synthesizer for SynthesizerPipeline {
    async fn synthesize(&self, prompt: &str, preliminary_score: f64) -> PaResult<SynthesizedDecision> {
        let candidate = if let Some(response) = self.try_client(&self.primary, prompt).await {
            response
        } else if let Some(response) = self.try_client(&self.fallback, prompt).await {
            response
        } else {
            self.rule_based_decision(preliminary_score, &[])
        };
        payload_to_decision(candidate)
    }
}
