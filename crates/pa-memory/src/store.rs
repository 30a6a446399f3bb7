//! Content-addressed document store (§4.1).

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pa_contracts::document::{ArticleInput, CanonicalId, Document, DocumentMetadata, DocumentType};
use pa_contracts::error::PaResult;
use pa_core::traits::{DocumentStore, UpsertSummary};

use crate::analytics::{self, UsageAnalytics};
use crate::entity_extract::{extract_diseases, extract_drugs};
use crate::recommend::{self, ResearchQuery, ResearchRecommendation};
use crate::similarity::{adjusted_distance, recency_factor, token_distance};

/// One hit from a similarity search: the document and its adjusted distance
/// (smaller is more similar).
#[derive(Debug, Clone)]
pub struct SimilarityHit {
    pub canonical_id: CanonicalId,
    pub distance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SimilarityFilters {
    pub document_type: Option<DocumentType>,
}

fn document_type_for_tag(tag: &str) -> DocumentType {
    match tag {
        "workflow_summary" => DocumentType::WorkflowSummary,
        "pubmed_article" => DocumentType::PubmedArticle,
        "guideline" => DocumentType::Guideline,
        other => DocumentType::Other(other.to_string()),
    }
}

pub struct DocumentCollection {
    documents: Mutex<BTreeMap<CanonicalId, Document>>,
}

impl Default for DocumentCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, id: &CanonicalId) -> Option<Document> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    pub fn all(&self) -> Vec<Document> {
        self.documents.lock().unwrap().values().cloned().collect()
    }

    /// Merge one `(canonical_id, body)` into `store`, returning `true` if a
    /// new document was inserted and `false` if an existing one was merged.
    fn merge_or_insert(
        store: &mut BTreeMap<CanonicalId, Document>,
        document_type_tag: &str,
        canonical_id: CanonicalId,
        body: String,
        workflow_id: &str,
        user_goal: &str,
        timestamp: DateTime<Utc>,
    ) -> bool {
        let drugs = extract_drugs(&body);
        let diseases = extract_diseases(&body);

        match store.get_mut(&canonical_id) {
            Some(existing) => {
                existing.metadata.workflow_ids.insert(workflow_id.to_string());
                existing.metadata.user_goals_context.insert(user_goal.to_string());
                existing.metadata.drug_names_context.extend(drugs);
                existing.metadata.disease_names_context.extend(diseases);
                existing.metadata.last_seen = timestamp;
                if existing.body.is_empty() && !body.is_empty() {
                    existing.body = body;
                }
                false
            }
            None => {
                let metadata = DocumentMetadata {
                    document_type: document_type_for_tag(document_type_tag),
                    workflow_ids: [workflow_id.to_string()].into_iter().collect(),
                    user_goals_context: [user_goal.to_string()].into_iter().collect(),
                    drug_names_context: drugs,
                    disease_names_context: diseases,
                    first_seen: timestamp,
                    last_seen: timestamp,
                };
                store.insert(canonical_id.clone(), Document { canonical_id, body, metadata });
                true
            }
        }
    }

    /// Merge-on-upsert per §4.1: set-union context fields, keep `first_seen`,
    /// refresh `last_seen`, fill scalar-ish fields (here, the body) only when
    /// previously absent. `articles` are upserted the same way, each keyed
    /// on its `pmid`. `pdf_path`, when present, is noted (by filename only —
    /// generating the report itself is out of scope) in the body of any
    /// `workflow_summary` entity passed in this same call.
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_workflow_outputs(
        &self,
        workflow_id: &str,
        user_goal: &str,
        entities: Vec<(String, String, String)>,
        articles: Vec<ArticleInput>,
        pdf_path: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> UpsertSummary {
        let mut store = self.documents.lock().unwrap();
        let mut new = 0;
        let mut updated = 0;

        let report_note = pdf_path.map(|path| {
            let filename = path.rsplit(['/', '\\']).next().unwrap_or(path);
            format!(". Report: {filename}")
        });

        for (document_type_tag, identifier, mut body) in entities {
            if document_type_tag == "workflow_summary" {
                if let Some(note) = &report_note {
                    body.push_str(note);
                }
            }
            let canonical_id = CanonicalId::derive(&document_type_tag, &identifier);
            if Self::merge_or_insert(&mut store, &document_type_tag, canonical_id, body, workflow_id, user_goal, timestamp) {
                new += 1;
            } else {
                updated += 1;
            }
        }

        for article in articles {
            let canonical_id = CanonicalId::derive("pubmed_article", &article.pmid);
            let body = format!("Title: {}\nAbstract: {}", article.title, article.abstract_text);
            if Self::merge_or_insert(&mut store, "pubmed_article", canonical_id, body, workflow_id, user_goal, timestamp) {
                new += 1;
            } else {
                updated += 1;
            }
        }

        UpsertSummary {
            new,
            updated,
            total: store.len(),
        }
    }

    /// Full-knobbed similarity search (§4.1): `n` results, optional type
    /// filter, optional `reference_count` floor, optional recency weighting.
    pub fn find_similar_detailed(
        &self,
        query: &str,
        n: usize,
        filters: Option<SimilarityFilters>,
        quality_threshold: Option<usize>,
        recency_weight: Option<f64>,
    ) -> Vec<SimilarityHit> {
        let now = Utc::now();
        let recency_weight = recency_weight.unwrap_or(0.0);
        let store = self.documents.lock().unwrap();

        let mut hits: Vec<SimilarityHit> = store
            .values()
            .filter(|doc| {
                filters
                    .as_ref()
                    .and_then(|f| f.document_type.as_ref())
                    .map(|wanted| &doc.metadata.document_type == wanted)
                    .unwrap_or(true)
            })
            .filter(|doc| {
                quality_threshold
                    .map(|threshold| doc.metadata.reference_count() >= threshold)
                    .unwrap_or(true)
            })
            .map(|doc| {
                let base = token_distance(query, &doc.body);
                let recency = recency_factor(doc.metadata.last_seen, now);
                SimilarityHit {
                    canonical_id: doc.canonical_id.clone(),
                    distance: adjusted_distance(base, recency_weight, recency),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap()
                .then_with(|| a.canonical_id.cmp(&b.canonical_id))
        });
        hits.truncate(n);
        hits
    }

    pub fn usage_analytics(&self) -> UsageAnalytics {
        analytics::usage_analytics(&self.all())
    }

    pub fn research_recommendations(&self, query: &ResearchQuery) -> ResearchRecommendation {
        recommend::research_recommendations(self, query)
    }
}

#[async_trait]
impl DocumentStore for DocumentCollection {
    async fn upsert_workflow_outputs(
        &self,
        workflow_id: &str,
        user_goal: &str,
        entities: Vec<(String, String, String)>,
        articles: Vec<ArticleInput>,
        pdf_path: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> PaResult<UpsertSummary> {
        Ok(self.upsert_workflow_outputs(workflow_id, user_goal, entities, articles, pdf_path, timestamp))
    }

    async fn find_similar(&self, query: &str, n: usize) -> PaResult<Vec<CanonicalId>> {
        Ok(self
            .find_similar_detailed(query, n, None, None, None)
            .into_iter()
            .map(|hit| hit.canonical_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_with_two_docs() -> DocumentCollection {
        let collection = DocumentCollection::new();
        collection.upsert_workflow_outputs(
            "workflow-1",
            "evaluate empagliflozin PA",
            vec![(
                "guideline".to_string(),
                "ada-2024".to_string(),
                "empagliflozin is first-line recommended for type 2 diabetes".to_string(),
            )],
            vec![],
            None,
            Utc::now(),
        );
        collection.upsert_workflow_outputs(
            "workflow-1",
            "evaluate empagliflozin PA",
            vec![(
                "pubmed_article".to_string(),
                "pmid-1".to_string(),
                "warfarin interacts with aspirin causing bleeding risk".to_string(),
            )],
            vec![],
            None,
            Utc::now(),
        );
        collection
    }

    #[test]
    fn upsert_new_document_is_counted_as_new() {
        let collection = DocumentCollection::new();
        let summary = collection.upsert_workflow_outputs(
            "workflow-1",
            "goal",
            vec![("guideline".to_string(), "ada-2024".to_string(), "text".to_string())],
            vec![],
            None,
            Utc::now(),
        );
        assert_eq!(summary.new, 1);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn upsert_existing_document_merges_context() {
        let collection = DocumentCollection::new();
        collection.upsert_workflow_outputs(
            "workflow-1",
            "goal-a",
            vec![("guideline".to_string(), "ada-2024".to_string(), "text".to_string())],
            vec![],
            None,
            Utc::now(),
        );
        let summary = collection.upsert_workflow_outputs(
            "workflow-2",
            "goal-b",
            vec![("guideline".to_string(), "ada-2024".to_string(), "text".to_string())],
            vec![],
            None,
            Utc::now(),
        );
        assert_eq!(summary.updated, 1);
        let id = CanonicalId::derive("guideline", "ada-2024");
        let doc = collection.get(&id).unwrap();
        assert_eq!(doc.metadata.workflow_ids.len(), 2);
        assert_eq!(doc.metadata.user_goals_context.len(), 2);
        assert_eq!(doc.metadata.reference_count(), 2);
    }

    #[test]
    fn articles_are_upserted_as_pubmed_documents() {
        let collection = DocumentCollection::new();
        let summary = collection.upsert_workflow_outputs(
            "workflow-1",
            "goal",
            vec![],
            vec![ArticleInput {
                pmid: "12345".to_string(),
                title: "SGLT2 inhibitors in type 2 diabetes".to_string(),
                abstract_text: "A review of efficacy and safety.".to_string(),
            }],
            None,
            Utc::now(),
        );
        assert_eq!(summary.new, 1);
        let id = CanonicalId::derive("pubmed_article", "12345");
        let doc = collection.get(&id).unwrap();
        assert!(doc.body.contains("SGLT2 inhibitors"));
    }

    #[test]
    fn pdf_path_is_noted_on_the_workflow_summary_body() {
        let collection = DocumentCollection::new();
        collection.upsert_workflow_outputs(
            "workflow-1",
            "goal",
            vec![("workflow_summary".to_string(), "workflow-1".to_string(), "Workflow Summary".to_string())],
            vec![],
            Some("/reports/workflow-1.pdf"),
            Utc::now(),
        );
        let id = CanonicalId::derive("workflow_summary", "workflow-1");
        let doc = collection.get(&id).unwrap();
        assert!(doc.body.contains("Report: workflow-1.pdf"));
    }

    #[test]
    fn find_similar_ranks_closer_text_first() {
        let collection = collection_with_two_docs();
        let hits = collection.find_similar_detailed("empagliflozin diabetes", 2, None, None, None);
        assert_eq!(hits[0].canonical_id, CanonicalId::derive("guideline", "ada-2024"));
    }

    #[test]
    fn find_similar_honors_quality_threshold() {
        let collection = collection_with_two_docs();
        let hits = collection.find_similar_detailed("empagliflozin", 5, None, Some(2), None);
        assert!(hits.is_empty());
    }
}
