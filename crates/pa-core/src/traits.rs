//! Cross-cutting service trait definitions for the PA decision orchestrator.
//!
//! These traits define the seams the orchestrator gathers across:
//!
//! - `PatientService`   — patient chart lookups, search, and mutation
//! - `DrugService`       — drug information, interactions, and safety
//! - `PolicyService`     — insurer coverage and the criteria evaluator
//! - `GuidelineService`  — clinical guideline snippets
//! - `Synthesizer`       — LLM decision synthesis with fallback
//! - `DocumentStore`     — the content-addressed evidence/document collection
//!
//! The orchestrator depends only on these traits; concrete implementations
//! (mock-data-backed in this workspace) live in `pa-specialists`,
//! `pa-synthesizer`, and `pa-memory`.

use async_trait::async_trait;
use pa_contracts::document::CanonicalId;
use pa_contracts::drug::{DrugInformation, DrugSafetySummary};
use pa_contracts::error::PaResult;
use pa_contracts::interaction::{InteractionResult, SeveritySummary};
use pa_contracts::patient::{FilteredPatientRecord, PatientRecord, PatientSearchHit, Role, SearchCriteria};
use pa_contracts::policy::{AlternativeDrug, CoverageDecision, InsurerPolicy};
use pa_contracts::analysis::GuidelineSnippet;

/// Patient chart lookups, search, and mutation (§4.2.2).
#[async_trait]
pub trait PatientService: Send + Sync {
    async fn get(&self, patient_id: &str, role: Role) -> PaResult<FilteredPatientRecord>;

    /// Unfiltered record for internal orchestrator use (e.g. the interaction
    /// check needs the raw medication history). Never returned to a caller.
    async fn get_raw(&self, patient_id: &str) -> PaResult<PatientRecord>;

    async fn search(
        &self,
        criteria: SearchCriteria,
        page: u32,
        page_size: u32,
        role: Role,
    ) -> PaResult<(Vec<PatientSearchHit>, u32)>;

    async fn update(
        &self,
        patient_id: &str,
        updates: serde_json::Value,
        role: Role,
    ) -> PaResult<FilteredPatientRecord>;

    async fn consent(&self, patient_id: &str, action: &str) -> PaResult<bool>;
}

/// Drug information, interactions, and safety (§4.2.3).
#[async_trait]
pub trait DrugService: Send + Sync {
    async fn info(&self, drug: &str) -> PaResult<DrugInformation>;

    async fn interactions(
        &self,
        drugs: &[String],
    ) -> PaResult<(Vec<InteractionResult>, SeveritySummary)>;

    async fn class(&self, drug: &str) -> PaResult<String>;

    async fn safety(&self, drug: &str) -> PaResult<DrugSafetySummary>;
}

/// Insurer coverage and the deterministic criteria evaluator (§4.2.4).
#[async_trait]
pub trait PolicyService: Send + Sync {
    async fn get_policy(&self, drug: &str, insurer: &str) -> PaResult<InsurerPolicy>;

    async fn check_coverage(
        &self,
        drug: &str,
        insurer: &str,
        patient: &PatientRecord,
    ) -> PaResult<CoverageDecision>;

    async fn alternatives(&self, drug: &str, insurer: &str) -> PaResult<Vec<AlternativeDrug>>;
}

/// Clinical guideline snippets (§4.2.5).
#[async_trait]
pub trait GuidelineService: Send + Sync {
    async fn search(&self, drug: &str, indication: Option<&str>) -> PaResult<Vec<GuidelineSnippet>>;
}

/// A synthesized decision before it is folded into an `AnalysisResult`.
#[derive(Debug, Clone)]
pub struct SynthesizedDecision {
    pub approval_likelihood_percent: f64,
    pub decision_prediction: String,
    pub confidence_score: f64,
    pub clinical_rationale: String,
    pub model_tier: String,
    pub tokens_used: u32,
}

/// Converts context and evidence into a structured decision, with
/// primary -> fallback -> rule-based degradation (§4.4).
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str, preliminary_score: f64) -> PaResult<SynthesizedDecision>;
}

/// The content-addressed document collection (§4.1).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn upsert_workflow_outputs(
        &self,
        workflow_id: &str,
        user_goal: &str,
        entities: Vec<(String, String, String)>,
        articles: Vec<pa_contracts::document::ArticleInput>,
        pdf_path: Option<&str>,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> PaResult<UpsertSummary>;

    async fn find_similar(&self, query: &str, n: usize) -> PaResult<Vec<CanonicalId>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertSummary {
    pub new: usize,
    pub updated: usize,
    pub total: usize,
}
