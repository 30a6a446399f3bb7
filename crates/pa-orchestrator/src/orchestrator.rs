//! `PaOrchestrator`: the end-to-end `predict_approval_likelihood` flow (§4.5).

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use pa_audit::InMemoryAuditWriter;
use pa_contracts::analysis::{AnalysisContext, AnalysisResult, AuditEntry, ConfidenceLevel, Decision};
use pa_contracts::error::{PaError, PaResult};
use pa_core::context::Context as CoreContext;
use pa_core::traits::{DrugService, GuidelineService, PatientService, PolicyService};
use pa_evidence::engine::assess;
use pa_synthesizer::SynthesizerPipeline;

use crate::alternatives::build_alternatives;
use crate::cache::{cache_key, new_result_cache, patient_updated_recently, ResultCache};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::gather;
use crate::recommendations::build_recommendations;

/// Urgency markers that route a pended case to `Decision::UrgentReview`
/// instead of `Decision::Pend` (open question: spec.md names
/// `UrgentReview` in the data model but does not say what triggers it).
const URGENT_MARKERS: [&str; 2] = ["urgent", "stat"];

pub struct PaOrchestrator {
    patient_service: Arc<dyn PatientService>,
    drug_service: Arc<dyn DrugService>,
    policy_service: Arc<dyn PolicyService>,
    guideline_service: Arc<dyn GuidelineService>,
    synthesizer: Arc<SynthesizerPipeline>,
    cache: ResultCache,
    metrics: Metrics,
    context: CoreContext,
}

impl PaOrchestrator {
    pub fn new(
        patient_service: Arc<dyn PatientService>,
        drug_service: Arc<dyn DrugService>,
        policy_service: Arc<dyn PolicyService>,
        guideline_service: Arc<dyn GuidelineService>,
        synthesizer: Arc<SynthesizerPipeline>,
        context: CoreContext,
    ) -> Self {
        let cache = new_result_cache(context.config.max_cache_size, context.config.cache_ttl_seconds);
        Self {
            patient_service,
            drug_service,
            policy_service,
            guideline_service,
            synthesizer,
            cache,
            metrics: Metrics::new(),
            context,
        }
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn decision_from_prediction(prediction: &str, urgency: Option<&str>) -> Decision {
        let is_urgent = urgency
            .map(|u| URGENT_MARKERS.iter().any(|m| u.eq_ignore_ascii_case(m)))
            .unwrap_or(false);

        match prediction {
            "Approve" => Decision::Approve,
            "Deny" => Decision::Deny,
            _ if is_urgent => Decision::UrgentReview,
            _ => Decision::Pend,
        }
    }

    fn identified_gaps(decision: Decision, context: &AnalysisContext) -> Vec<String> {
        if decision == Decision::Approve {
            return vec![];
        }
        let mut gaps = Vec::new();
        if context.patient_record.as_ref().map(|p| p.labs.is_empty()).unwrap_or(true) {
            gaps.push("no recent lab values on file".to_string());
        }
        if context
            .patient_record
            .as_ref()
            .map(|p| p.medication_history.is_empty())
            .unwrap_or(true)
        {
            gaps.push("no medication history on file".to_string());
        }
        gaps
    }

    /// `predict_approval_likelihood` (§4.5 end-to-end flow).
    pub async fn predict_approval_likelihood(
        &self,
        patient_id: &str,
        drug_name: &str,
        insurer_id: &str,
        urgency: Option<String>,
    ) -> PaResult<AnalysisResult> {
        let started = Instant::now();
        let key = cache_key(patient_id, drug_name, insurer_id);

        if let Some(cached) = self.cache.get(&key) {
            let invalidated = match self.patient_service.get_raw(patient_id).await {
                Ok(record) => patient_updated_recently(record.last_updated, Utc::now()),
                Err(_) => false,
            };

            if invalidated {
                warn!(patient_id, "cached decision invalidated by a recent patient record update");
                self.cache.remove(&key);
            } else {
                self.metrics.record_cache_hit();
                let mut result = cached;
                let cache_age_seconds = (Utc::now() - result.analysis_timestamp).num_seconds().max(0) as u64;
                result.source = "cache".to_string();
                result.cache_age_seconds = Some(cache_age_seconds);
                result.audit_trail.push(AuditEntry {
                    timestamp: Utc::now(),
                    action: "cache_hit".to_string(),
                    details: format!("served from cache, age {cache_age_seconds}s"),
                    agent_id: "pa-orchestrator".to_string(),
                });
                result.processing_time_ms = started.elapsed().as_millis() as u64;
                return Ok(result);
            }
        }
        self.metrics.record_cache_miss();

        let decision_id =
            AnalysisResult::build_decision_id(patient_id, drug_name, self.context.clock.now().timestamp());
        let audit = InMemoryAuditWriter::new(decision_id.clone());

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "data_gathering_start".to_string(),
            details: format!("patient={patient_id} drug={drug_name} insurer={insurer_id}"),
            agent_id: "pa-orchestrator".to_string(),
        });

        let timeout = Duration::from_secs(self.context.config.timeout_seconds);
        let gathered = gather::gather(
            patient_id,
            drug_name,
            insurer_id,
            &self.patient_service,
            &self.drug_service,
            &self.policy_service,
            &self.guideline_service,
            timeout,
        )
        .await;

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "data_gathering_complete".to_string(),
            details: "gather phase finished".to_string(),
            agent_id: "pa-orchestrator".to_string(),
        });

        let patient_record = match &gathered.patient {
            Some(p) => p.clone(),
            None => {
                warn!(patient_id, "no patient record available, failing request");
                audit.write(&AuditEntry {
                    timestamp: self.context.clock.now(),
                    action: "decision_finalized".to_string(),
                    details: "fatal: patient record unavailable".to_string(),
                    agent_id: "pa-orchestrator".to_string(),
                });
                self.metrics.record_failure(started.elapsed().as_millis() as u64);
                return Err(PaError::Fatal {
                    reason: format!("no patient record available for '{patient_id}'"),
                });
            }
        };

        let context = AnalysisContext {
            patient_id: patient_id.to_string(),
            drug_name: drug_name.to_string(),
            insurer_id: insurer_id.to_string(),
            urgency: urgency.clone(),
            patient_record: Some(patient_record.clone()),
            drug_info: gathered.drug_info.clone(),
            policy: gathered.policy.clone(),
            guidelines: gathered.guidelines.clone(),
            drug_safety: gathered.drug_safety.clone(),
            coverage_decision: gathered.coverage_decision.clone(),
            interaction_check: gathered.interaction_check.clone(),
        };

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "analysis_start".to_string(),
            details: "evidence engine starting".to_string(),
            agent_id: "pa-orchestrator".to_string(),
        });

        let assessment = assess(&context);

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "analysis_complete".to_string(),
            details: format!(
                "preliminary_score={:.3} confidence_score={:.3}",
                assessment.preliminary_score, assessment.confidence_score
            ),
            agent_id: "pa-orchestrator".to_string(),
        });

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "llm_synthesis_start".to_string(),
            details: "synthesizer pipeline starting".to_string(),
            agent_id: "pa-orchestrator".to_string(),
        });

        let synthesized = self
            .synthesizer
            .run(&decision_id, &context, &assessment.items, assessment.preliminary_score, assessment.confidence_score)
            .await?;

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "llm_synthesis_complete".to_string(),
            details: format!("model_tier={}", synthesized.model_tier),
            agent_id: "pa-orchestrator".to_string(),
        });

        let decision = Self::decision_from_prediction(&synthesized.decision_prediction, urgency.as_deref());
        let confidence_level = ConfidenceLevel::from_score(synthesized.confidence_score);

        let alternatives = context
            .policy
            .as_ref()
            .map(|p| build_alternatives(&p.alternatives, context.drug_info.as_ref().map(|d| d.drug_class.as_str())))
            .unwrap_or_default();

        let recommendations = build_recommendations(
            decision,
            context.coverage_decision.as_ref(),
            context.patient_record.as_ref(),
            context.drug_info.as_ref(),
            &alternatives,
        );

        let identified_gaps = Self::identified_gaps(decision, &context);

        audit.write(&AuditEntry {
            timestamp: self.context.clock.now(),
            action: "decision_finalized".to_string(),
            details: format!("decision={decision:?}"),
            agent_id: "pa-orchestrator".to_string(),
        });
        audit.finalize();

        let processing_time_ms = started.elapsed().as_millis() as u64;

        let result = AnalysisResult {
            decision_id,
            patient_id: patient_id.to_string(),
            drug_name: drug_name.to_string(),
            insurer_id: insurer_id.to_string(),
            decision,
            approval_likelihood: synthesized.approval_likelihood_percent,
            confidence_score: synthesized.confidence_score,
            confidence_level,
            clinical_rationale: synthesized.clinical_rationale,
            evidence_items: assessment.items,
            identified_gaps,
            recommendations,
            alternative_options: alternatives,
            processing_time_ms,
            llm_tokens_used: synthesized.tokens_used,
            analysis_timestamp: Utc::now(),
            audit_trail: audit.entries(),
            source: "live".to_string(),
            cache_age_seconds: None,
        };

        self.cache.put(key, result.clone());
        self.metrics.record_success(processing_time_ms, synthesized.tokens_used);

        info!(decision_id = %result.decision_id, decision = ?result.decision, "prediction finalized");
        Ok(result)
    }

    pub fn patient_service(&self) -> &Arc<dyn PatientService> {
        &self.patient_service
    }

    pub fn drug_service(&self) -> &Arc<dyn DrugService> {
        &self.drug_service
    }

    pub fn policy_service(&self) -> &Arc<dyn PolicyService> {
        &self.policy_service
    }

    pub fn guideline_service(&self) -> &Arc<dyn GuidelineService> {
        &self.guideline_service
    }
}
