//! Document Collection entities (§3, §4.1): content-addressed documents with
//! mutable, mergeable metadata.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deduplication key derived from `(document_type, identifier)` by
/// lowercasing and replacing `[ /-]` with `_`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalId(pub String);

impl CanonicalId {
    pub fn derive(document_type: &str, identifier: &str) -> Self {
        let raw = format!("{document_type}:{identifier}").to_lowercase();
        let normalized: String = raw
            .chars()
            .map(|c| if c == ' ' || c == '/' || c == '-' { '_' } else { c })
            .collect();
        Self(normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    WorkflowSummary,
    PubmedArticle,
    Guideline,
    Other(String),
}

impl DocumentType {
    pub fn as_tag(&self) -> String {
        match self {
            DocumentType::WorkflowSummary => "workflow_summary".to_string(),
            DocumentType::PubmedArticle => "pubmed_article".to_string(),
            DocumentType::Guideline => "guideline".to_string(),
            DocumentType::Other(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub document_type: DocumentType,
    pub workflow_ids: BTreeSet<String>,
    pub user_goals_context: BTreeSet<String>,
    pub drug_names_context: BTreeSet<String>,
    pub disease_names_context: BTreeSet<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl DocumentMetadata {
    /// `reference_count = |workflow_ids|` — an invariant of this type, never
    /// stored redundantly.
    pub fn reference_count(&self) -> usize {
        self.workflow_ids.len()
    }
}

/// An immutable document body paired with mutable, merge-on-upsert metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub canonical_id: CanonicalId,
    pub body: String,
    pub metadata: DocumentMetadata,
}

/// A PubMed-style article supplied to `upsert_workflow_outputs` alongside
/// the workflow's other entities (§4.1). Each article becomes its own
/// `pubmed_article` document, canonicalized on `pmid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleInput {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_normalizes_whitespace_and_punctuation() {
        let a = CanonicalId::derive("Guideline", "ADA 2024 - Type 2");
        assert_eq!(a.0, "guideline:ada_2024___type_2");
    }

    #[test]
    fn canonical_id_is_deterministic() {
        let a = CanonicalId::derive("guideline", "ADA-2024");
        let b = CanonicalId::derive("guideline", "ADA-2024");
        assert_eq!(a, b);
    }
}
