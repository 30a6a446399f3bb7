//! Supplemental analytics over the document collection (SPEC_FULL.md §4.1
//! supplement, grounded on `enhanced_memory_manager.py`): temporal drift,
//! contradiction detection, research gaps, and cross-workflow reuse signals.
//! Composes a [`DocumentCollection`] rather than subclassing it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use pa_contracts::document::{CanonicalId, Document, DocumentType};
use pa_contracts::keywords::count_terms;

use crate::store::DocumentCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgeBand {
    Recent,
    RecentPast,
    Historical,
}

fn age_band(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> AgeBand {
    let age_days = (now - last_seen).num_days();
    if age_days <= 30 {
        AgeBand::Recent
    } else if age_days <= 180 {
        AgeBand::RecentPast
    } else {
        AgeBand::Historical
    }
}

fn dominant_band(docs: &[&Document], now: DateTime<Utc>) -> Option<AgeBand> {
    let mut counts: BTreeMap<AgeBand, usize> = BTreeMap::new();
    for doc in docs {
        *counts.entry(age_band(doc.metadata.last_seen, now)).or_insert(0) += 1;
    }
    counts.into_iter().max_by_key(|(_, count)| *count).map(|(band, _)| band)
}

#[derive(Debug, Clone)]
pub struct TemporalPattern {
    pub entity: String,
    pub dominant_band_first_half: AgeBand,
    pub dominant_band_second_half: AgeBand,
    pub shifted: bool,
}

#[derive(Debug, Clone)]
pub struct Contradiction {
    pub entity: String,
    pub positive_doc: CanonicalId,
    pub negative_doc: CanonicalId,
}

#[derive(Debug, Clone)]
pub enum GapReason {
    InsufficientDocuments { count: usize },
    MissingDocumentType(DocumentType),
}

#[derive(Debug, Clone)]
pub struct ResearchGap {
    pub entity: String,
    pub reason: GapReason,
}

#[derive(Debug, Clone)]
pub struct CrossWorkflowInsight {
    pub context: String,
    pub document_ids: Vec<CanonicalId>,
    pub reference_count_total: usize,
}

fn docs_for_entity<'a>(docs: &'a [Document], entity: &str) -> Vec<&'a Document> {
    docs.iter()
        .filter(|d| {
            d.metadata.drug_names_context.contains(entity) || d.metadata.disease_names_context.contains(entity)
        })
        .collect()
}

pub struct EnhancedDocumentCollection {
    base: DocumentCollection,
}

impl Default for EnhancedDocumentCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedDocumentCollection {
    pub fn new() -> Self {
        Self {
            base: DocumentCollection::new(),
        }
    }

    pub fn base(&self) -> &DocumentCollection {
        &self.base
    }

    /// Splits `entity`'s documents (ordered by `first_seen`) into two halves
    /// and reports whether the dominant age band shifted between them.
    pub fn temporal_patterns(&self, entity: &str) -> Vec<TemporalPattern> {
        let all = self.base.all();
        let mut matching = docs_for_entity(&all, entity);
        if matching.len() < 2 {
            return vec![];
        }
        matching.sort_by_key(|d| d.metadata.first_seen);

        let now = Utc::now();
        let mid = matching.len() / 2;
        let (first_half, second_half) = matching.split_at(mid);

        let Some(first_band) = dominant_band(first_half, now) else {
            return vec![];
        };
        let Some(second_band) = dominant_band(second_half, now) else {
            return vec![];
        };

        vec![TemporalPattern {
            entity: entity.to_string(),
            dominant_band_first_half: first_band,
            dominant_band_second_half: second_band,
            shifted: first_band != second_band,
        }]
    }

    /// Pairs of documents about the same entity whose guideline-keyword
    /// signals disagree — one net-positive, one net-negative (§4.3 keyword
    /// lists, shared via `pa_contracts::keywords`).
    pub fn contradictions(&self, entity: &str) -> Vec<Contradiction> {
        let all = self.base.all();
        let matching = docs_for_entity(&all, entity);

        let mut positives = Vec::new();
        let mut negatives = Vec::new();
        for doc in &matching {
            let (pos, neg) = count_terms(&doc.body);
            if pos > neg {
                positives.push(doc.canonical_id.clone());
            } else if neg > pos {
                negatives.push(doc.canonical_id.clone());
            }
        }

        let mut out = Vec::new();
        for positive_doc in &positives {
            for negative_doc in &negatives {
                out.push(Contradiction {
                    entity: entity.to_string(),
                    positive_doc: positive_doc.clone(),
                    negative_doc: negative_doc.clone(),
                });
            }
        }
        out
    }

    /// Entities backed by fewer than `quality_threshold` matching documents,
    /// or with zero documents of some document type (default threshold: 2).
    pub fn research_gaps(&self, entities: &[String]) -> Vec<ResearchGap> {
        const DEFAULT_QUALITY_THRESHOLD: usize = 2;
        let all = self.base.all();
        let mut gaps = Vec::new();

        for entity in entities {
            let matching = docs_for_entity(&all, entity);
            if matching.len() < DEFAULT_QUALITY_THRESHOLD {
                gaps.push(ResearchGap {
                    entity: entity.clone(),
                    reason: GapReason::InsufficientDocuments { count: matching.len() },
                });
            }
            for document_type in [DocumentType::Guideline, DocumentType::PubmedArticle, DocumentType::WorkflowSummary] {
                if !matching.iter().any(|d| d.metadata.document_type == document_type) {
                    gaps.push(ResearchGap {
                        entity: entity.clone(),
                        reason: GapReason::MissingDocumentType(document_type),
                    });
                }
            }
        }
        gaps
    }

    /// Documents referenced by two or more workflows, grouped by shared drug
    /// context, as a reusable-evidence signal.
    pub fn cross_workflow_insights(&self) -> Vec<CrossWorkflowInsight> {
        let all = self.base.all();
        let mut by_context: BTreeMap<String, (Vec<CanonicalId>, usize)> = BTreeMap::new();

        for doc in &all {
            if doc.metadata.reference_count() < 2 {
                continue;
            }
            for context in doc.metadata.drug_names_context.iter().chain(doc.metadata.disease_names_context.iter()) {
                let entry = by_context.entry(context.clone()).or_insert((vec![], 0));
                entry.0.push(doc.canonical_id.clone());
                entry.1 += doc.metadata.reference_count();
            }
        }

        by_context
            .into_iter()
            .map(|(context, (document_ids, reference_count_total))| CrossWorkflowInsight {
                context,
                document_ids,
                reference_count_total,
            })
            .collect()
    }
}
