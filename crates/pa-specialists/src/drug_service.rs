//! Mock-data-backed `DrugService` (§4.2.3).

use async_trait::async_trait;
use tracing::debug;

use pa_audit::RateLimiter;
use pa_contracts::drug::{DrugInformation, DrugSafetySummary, SafetyProfile};
use pa_contracts::error::{PaError, PaResult};
use pa_contracts::interaction::{DrugPair, InteractionResult, InteractionSeverity, SeveritySummary};
use pa_core::traits::DrugService;

use crate::cache::LruCache;
use crate::mock_data;
use crate::normalize::normalize_drug_name;

const MAX_CACHE_SIZE: usize = 1000;

pub struct MockDrugService {
    cache: LruCache<DrugInformation>,
    rate_limiter: RateLimiter,
}

impl MockDrugService {
    pub fn new(rate_limiter: RateLimiter) -> Self {
        Self {
            cache: LruCache::new(MAX_CACHE_SIZE),
            rate_limiter,
        }
    }

    /// Exact normalized match, then prefix match in either direction, then
    /// the fallback snapshot (§4.2.3). Cache hits bypass the rate limit.
    fn lookup(&self, normalized: &str) -> Option<DrugInformation> {
        if let Some(info) = self.cache.get(normalized) {
            debug!(drug = normalized, "drug info cache hit");
            return Some(info);
        }

        let info = mock_data::drug_information(normalized).or_else(|| {
            mock_data::drug_information("empagliflozin")
                .into_iter()
                .chain(mock_data::drug_information("metformin"))
                .chain(mock_data::drug_information("warfarin"))
                .find(|candidate| {
                    let canon = candidate.canonical_name.to_lowercase();
                    canon.starts_with(normalized) || normalized.starts_with(&canon)
                })
        })?;

        self.cache.put(normalized.to_string(), info.clone());
        Some(info)
    }

    fn interaction_for_pair(a: &str, b: &str) -> InteractionResult {
        let (severity_str, description, management) = mock_data::known_interaction(a, b).unwrap_or((
            "unknown",
            "no interaction data available for this drug pair in the reference database",
            "consult a clinical pharmacist or full drug interaction database before co-prescribing",
        ));
        InteractionResult {
            drugs: DrugPair::new(a.to_string(), b.to_string()),
            severity: parse_severity(severity_str),
            description: description.to_string(),
            management: management.to_string(),
        }
    }
}

fn parse_severity(s: &str) -> InteractionSeverity {
    match s {
        "contraindicated" => InteractionSeverity::Contraindicated,
        "major" => InteractionSeverity::Major,
        "moderate" => InteractionSeverity::Moderate,
        "minor" => InteractionSeverity::Minor,
        "unknown" => InteractionSeverity::Unknown,
        _ => InteractionSeverity::None,
    }
}

#[async_trait]
impl DrugService for MockDrugService {
    async fn info(&self, drug: &str) -> PaResult<DrugInformation> {
        self.rate_limiter.acquire().await;
        let normalized = normalize_drug_name(drug);
        self.lookup(&normalized).ok_or_else(|| PaError::NotFound {
            entity: "drug".to_string(),
            id: drug.to_string(),
        })
    }

    async fn interactions(
        &self,
        drugs: &[String],
    ) -> PaResult<(Vec<InteractionResult>, SeveritySummary)> {
        if drugs.len() < 2 {
            return Ok((vec![], SeveritySummary::from_results(&[])));
        }

        let normalized: Vec<String> = drugs.iter().map(|d| normalize_drug_name(d)).collect();
        let mut results = Vec::new();
        for i in 0..normalized.len() {
            for j in (i + 1)..normalized.len() {
                results.push(Self::interaction_for_pair(&normalized[i], &normalized[j]));
            }
        }
        let summary = SeveritySummary::from_results(&results);
        Ok((results, summary))
    }

    async fn class(&self, drug: &str) -> PaResult<String> {
        let info = self.info(drug).await?;
        Ok(info.drug_class)
    }

    async fn safety(&self, drug: &str) -> PaResult<DrugSafetySummary> {
        let info = self.info(drug).await?;
        let profile = SafetyProfile::from_counts(info.warnings.len(), info.contraindications.len());
        Ok(DrugSafetySummary {
            drug_class: info.drug_class,
            warnings: info.warnings,
            contraindications: info.contraindications,
            monitoring_requirements: info.monitoring_requirements,
            safety_profile: profile,
        })
    }
}
