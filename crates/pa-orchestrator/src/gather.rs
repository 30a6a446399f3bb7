//! The parallel data-gathering phase (§4.5 step 2, §5).
//!
//! Patient lookup runs alongside drug/policy/guideline lookups; the
//! interaction check is the one ordered edge — it needs the patient's
//! medication history, so it is dispatched only after patient retrieval
//! completes. Each subtask carries its own timeout; expiry yields an empty
//! result for that subtask rather than failing the whole gather.

use std::sync::Arc;
use std::time::Duration;

use pa_contracts::analysis::GuidelineSnippet;
use pa_contracts::drug::{DrugInformation, DrugSafetySummary};
use pa_contracts::interaction::InteractionResult;
use pa_contracts::patient::{PatientRecord, Role};
use pa_contracts::policy::{CoverageDecision, InsurerPolicy};
use pa_core::traits::{DrugService, GuidelineService, PatientService, PolicyService};
use tracing::warn;

pub struct GatherResult {
    pub patient: Option<PatientRecord>,
    pub drug_info: Option<DrugInformation>,
    pub policy: Option<InsurerPolicy>,
    pub guidelines: Vec<GuidelineSnippet>,
    pub drug_safety: Option<DrugSafetySummary>,
    pub coverage_decision: Option<CoverageDecision>,
    pub interaction_check: Option<Vec<InteractionResult>>,
}

async fn with_timeout<T>(label: &str, timeout: Duration, fut: impl std::future::Future<Output = Option<T>>) -> Option<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(value) => value,
        Err(_) => {
            warn!(subtask = label, timeout_seconds = timeout.as_secs(), "gather subtask timed out");
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn gather(
    patient_id: &str,
    drug_name: &str,
    insurer_id: &str,
    patient_service: &Arc<dyn PatientService>,
    drug_service: &Arc<dyn DrugService>,
    policy_service: &Arc<dyn PolicyService>,
    guideline_service: &Arc<dyn GuidelineService>,
    timeout: Duration,
) -> GatherResult {
    let patient_fut = with_timeout("patient", timeout, async {
        patient_service.get_raw(patient_id).await.ok()
    });
    let drug_info_fut = with_timeout("drug_info", timeout, async { drug_service.info(drug_name).await.ok() });
    let policy_fut = with_timeout("policy", timeout, async {
        policy_service.get_policy(drug_name, insurer_id).await.ok()
    });
    let guidelines_fut = with_timeout("guidelines", timeout, async {
        guideline_service.search(drug_name, None).await.ok()
    });
    let safety_fut = with_timeout("drug_safety", timeout, async { drug_service.safety(drug_name).await.ok() });

    let (patient, drug_info, policy, guidelines, drug_safety) =
        tokio::join!(patient_fut, drug_info_fut, policy_fut, guidelines_fut, safety_fut);

    let coverage_decision = if let Some(p) = &patient {
        with_timeout("coverage_decision", timeout, async {
            policy_service.check_coverage(drug_name, insurer_id, p).await.ok()
        })
        .await
    } else {
        None
    };

    let interaction_check = if let Some(p) = &patient {
        if p.medication_history.is_empty() {
            Some(vec![])
        } else {
            let mut drugs = p.medication_history.clone();
            drugs.push(drug_name.to_string());
            with_timeout("interaction_check", timeout, async {
                drug_service.interactions(&drugs).await.ok().map(|(results, _)| results)
            })
            .await
        }
    } else {
        None
    };

    GatherResult {
        patient,
        drug_info,
        policy,
        guidelines: guidelines.unwrap_or_default(),
        drug_safety,
        coverage_decision,
        interaction_check,
    }
}

/// Role used for the internal raw patient fetch during gather; orchestration
/// always reads the unfiltered record (§4.2.2 — filtering happens only at
/// the `get_patient_record` operation boundary, not inside the core flow).
pub const INTERNAL_ROLE: Role = Role::System;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timeout_wrapper_returns_none_on_expiry() {
        let result: Option<u32> = with_timeout("slow", Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Some(1)
        })
        .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn timeout_wrapper_returns_value_when_fast_enough() {
        let result = with_timeout("fast", Duration::from_secs(1), async { Some(7) }).await;
        assert_eq!(result, Some(7));
    }
}
