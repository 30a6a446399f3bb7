//! Mock-data-backed `GuidelineService` (§4.2.5).

use async_trait::async_trait;

use pa_contracts::analysis::GuidelineSnippet;
use pa_contracts::error::PaResult;
use pa_core::traits::GuidelineService;

use crate::mock_data;
use crate::normalize::normalize_drug_name;

#[derive(Default)]
pub struct MockGuidelineService;

impl MockGuidelineService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GuidelineService for MockGuidelineService {
    async fn search(&self, drug: &str, _indication: Option<&str>) -> PaResult<Vec<GuidelineSnippet>> {
        let normalized = normalize_drug_name(drug);
        let mut snippets = mock_data::guidelines_for(&normalized);
        snippets.sort_by(|a, b| b.relevance_score.partial_cmp(&a.relevance_score).unwrap());
        Ok(snippets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_returns_sorted_by_relevance() {
        let svc = MockGuidelineService::new();
        let snippets = svc.search("empagliflozin", None).await.unwrap();
        assert!(!snippets.is_empty());
        assert!(snippets.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[tokio::test]
    async fn search_unknown_drug_returns_empty() {
        let svc = MockGuidelineService::new();
        let snippets = svc.search("unknown-drug", None).await.unwrap();
        assert!(snippets.is_empty());
    }
}
