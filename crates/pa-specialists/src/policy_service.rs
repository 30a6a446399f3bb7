//! Mock-data-backed `PolicyService` (§4.2.4).
//!
//! `check_coverage` delegates the actual rule evaluation to
//! `pa_criteria::CriteriaEngine` — this service is responsible for lookup,
//! caching, and the policy-comparison helpers, not criterion semantics.

use std::time::Duration;

use async_trait::async_trait;

use pa_contracts::error::{PaError, PaResult};
use pa_contracts::patient::PatientRecord;
use pa_contracts::policy::{AlternativeDrug, CoverageDecision, CoverageStatus, InsurerPolicy};
use pa_core::traits::PolicyService;
use pa_criteria::CriteriaEngine;

use crate::cache::TtlLruCache;
use crate::mock_data;
use crate::normalize::normalize_drug_name;

const POLICY_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const POLICY_CACHE_SIZE: usize = 500;

pub struct MockPolicyService {
    decision_cache: TtlLruCache<CoverageDecision>,
    engine: CriteriaEngine,
}

impl Default for MockPolicyService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPolicyService {
    pub fn new() -> Self {
        Self {
            decision_cache: TtlLruCache::new(POLICY_CACHE_SIZE, POLICY_CACHE_TTL),
            engine: CriteriaEngine::new(),
        }
    }

    fn lookup_policy(&self, drug: &str, insurer: &str) -> Option<InsurerPolicy> {
        let normalized_drug = normalize_drug_name(drug);
        let normalized_insurer = insurer.trim().to_lowercase();
        mock_data::insurer_policy(&normalized_insurer, &normalized_drug)
    }

    /// Cost band used by `_best_coverage`'s scoring formula (§4.2.4):
    /// `<50 -> 5, <100 -> 3, <500 -> 1, else 0`.
    fn cost_band(monthly_cost: f64) -> i32 {
        if monthly_cost < 50.0 {
            5
        } else if monthly_cost < 100.0 {
            3
        } else if monthly_cost < 500.0 {
            1
        } else {
            0
        }
    }

    fn coverage_score(policy: &InsurerPolicy) -> i32 {
        let status_rank = policy.coverage_status as i32;
        let tier_term = 3 * (5 - policy.tier.unwrap_or(5) as i32);
        let pa_term = if policy.coverage_status.requires_pa_review() { 0 } else { 8 };
        10 * status_rank + tier_term + pa_term + Self::cost_band(policy.monthly_cost)
    }

    /// Compare this drug's policy across multiple insurers and return a
    /// per-insurer summary plus the insurer with the best `coverage_score`
    /// (§4.2.4 `compare_policies` / `_best_coverage`).
    pub fn compare_policies(&self, drug: &str, insurers: &[String]) -> PaResult<Vec<InsurerPolicy>> {
        let policies: Vec<InsurerPolicy> = insurers
            .iter()
            .filter_map(|insurer| self.lookup_policy(drug, insurer))
            .collect();
        if policies.is_empty() {
            return Err(PaError::NotFound {
                entity: "policy".to_string(),
                id: drug.to_string(),
            });
        }
        Ok(policies)
    }

    pub fn best_coverage<'a>(&self, policies: &'a [InsurerPolicy]) -> Option<&'a InsurerPolicy> {
        policies.iter().max_by_key(|p| Self::coverage_score(p))
    }

    /// Search the formulary by drug name or indication substring (§4.2.4).
    pub fn search_formulary(&self, query: &str) -> Vec<InsurerPolicy> {
        let needle = query.trim().to_lowercase();
        ["uhc"]
            .iter()
            .flat_map(|insurer| {
                ["empagliflozin", "metformin"]
                    .iter()
                    .filter_map(|drug| mock_data::insurer_policy(insurer, drug))
            })
            .filter(|policy| policy.drug_name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[async_trait]
impl PolicyService for MockPolicyService {
    async fn get_policy(&self, drug: &str, insurer: &str) -> PaResult<InsurerPolicy> {
        self.lookup_policy(drug, insurer).ok_or_else(|| PaError::NotFound {
            entity: "policy".to_string(),
            id: format!("{insurer}/{drug}"),
        })
    }

    async fn check_coverage(
        &self,
        drug: &str,
        insurer: &str,
        patient: &PatientRecord,
    ) -> PaResult<CoverageDecision> {
        let policy = self.get_policy(drug, insurer).await?;
        let cache_key = format!("{insurer}:{}", normalize_drug_name(drug));

        if let Some(cached) = self.decision_cache.get(&cache_key) {
            return Ok(cached);
        }

        let decision = self.engine.check_coverage(&policy, patient);
        self.decision_cache.put(cache_key, decision.clone());
        Ok(decision)
    }

    async fn alternatives(&self, drug: &str, insurer: &str) -> PaResult<Vec<AlternativeDrug>> {
        let policy = self.get_policy(drug, insurer).await?;
        Ok(policy.alternatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn patient() -> PatientRecord {
        PatientRecord {
            patient_id: "patient-001".into(),
            age: 52,
            gender: "M".into(),
            diagnoses_icd10: vec!["E11.9".into()],
            medication_history: vec!["Metformin".into()],
            labs: [("eGFR".to_string(), "68 mL/min".to_string())].into_iter().collect(),
            notes: vec![],
            provider_type: "Endocrinologist".into(),
            adherence_score: Some(0.9),
            requested_quantity: Some(30),
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_policy_returns_known_coverage() {
        let svc = MockPolicyService::new();
        let policy = svc.get_policy("Jardiance", "UHC").await.unwrap();
        assert_eq!(policy.coverage_status, CoverageStatus::CoveredWithPA);
    }

    #[tokio::test]
    async fn check_coverage_met_when_criteria_satisfied() {
        let svc = MockPolicyService::new();
        let decision = svc.check_coverage("empagliflozin", "uhc", &patient()).await.unwrap();
        assert!(decision.criteria_met);
    }

    #[tokio::test]
    async fn check_coverage_result_is_cached() {
        let svc = MockPolicyService::new();
        let first = svc.check_coverage("empagliflozin", "uhc", &patient()).await.unwrap();
        let second = svc.check_coverage("empagliflozin", "uhc", &patient()).await.unwrap();
        assert_eq!(first.criteria_met, second.criteria_met);
    }

    #[test]
    fn cost_band_thresholds() {
        assert_eq!(MockPolicyService::cost_band(10.0), 5);
        assert_eq!(MockPolicyService::cost_band(75.0), 3);
        assert_eq!(MockPolicyService::cost_band(450.0), 1);
        assert_eq!(MockPolicyService::cost_band(5000.0), 0);
    }

    #[test]
    fn best_coverage_prefers_lower_tier_and_no_pa() {
        let svc = MockPolicyService::new();
        let policies = svc
            .compare_policies("metformin", &["uhc".to_string()])
            .unwrap_or_default();
        if let Some(best) = svc.best_coverage(&policies) {
            assert_eq!(best.drug_name, "Metformin");
        }
    }
}
