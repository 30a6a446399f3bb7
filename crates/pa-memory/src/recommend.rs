//! Research recommendation engine (§4.1 `research_recommendations`): runs
//! four weighted similarity searches and scores a research strategy from
//! their combined signals.

use std::collections::{BTreeMap, BTreeSet};

use pa_contracts::document::{CanonicalId, DocumentType};

use crate::store::DocumentCollection;

const SGLT2_LIKE: &[&str] = &["empagliflozin", "dapagliflozin", "canagliflozin", "ertugliflozin"];

#[derive(Debug, Clone)]
pub struct ResearchQuery {
    pub drug: String,
    pub drug_class: Option<String>,
    pub mechanism_query: Option<String>,
    pub indication_query: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResearchStrategy {
    Comprehensive,
    Focused,
    Update,
}

#[derive(Debug, Clone)]
pub struct ResearchRecommendation {
    pub strategy: ResearchStrategy,
    pub existing_evidence: Vec<CanonicalId>,
    pub similar_drugs: Vec<String>,
    pub related_documents: Vec<CanonicalId>,
    pub priority_research: Vec<String>,
    pub gap_addressing: Vec<String>,
    pub cross_workflow_opportunities: Vec<CanonicalId>,
    pub confidence: f64,
}

struct WeightedQuery<'a> {
    label: &'a str,
    text: Option<String>,
    weight: f64,
}

pub fn research_recommendations(
    collection: &DocumentCollection,
    query: &ResearchQuery,
) -> ResearchRecommendation {
    let class_query = query.drug_class.clone().map(|c| format!("{} {}", query.drug, c));
    let queries = [
        WeightedQuery {
            label: "direct drug",
            text: Some(query.drug.clone()),
            weight: 1.0,
        },
        WeightedQuery {
            label: "drug class",
            text: class_query,
            weight: 0.8,
        },
        WeightedQuery {
            label: "mechanism",
            text: query.mechanism_query.clone(),
            weight: 0.7,
        },
        WeightedQuery {
            label: "indication",
            text: query.indication_query.clone(),
            weight: 0.6,
        },
    ];

    let mut candidate_scores: BTreeMap<CanonicalId, f64> = BTreeMap::new();
    let mut best_distance = f64::MAX;
    let mut weak_angles = Vec::new();

    for wq in &queries {
        let Some(text) = &wq.text else { continue };
        let hits = collection.find_similar_detailed(text, 5, None, None, None);
        let local_best = hits.iter().map(|h| h.distance).fold(f64::MAX, f64::min);
        if local_best < best_distance {
            best_distance = local_best;
        }
        if local_best > 0.3 {
            weak_angles.push(wq.label.to_string());
        }
        for hit in hits {
            let contribution = (1.0 - hit.distance) * wq.weight;
            *candidate_scores.entry(hit.canonical_id).or_insert(0.0) += contribution;
        }
    }
    if best_distance == f64::MAX {
        best_distance = 1.0;
    }

    let candidates: Vec<CanonicalId> = candidate_scores.keys().cloned().collect();
    let candidate_docs: Vec<_> = candidates.iter().filter_map(|id| collection.get(id)).collect();

    let mut similar_drugs: BTreeSet<String> = BTreeSet::new();
    let mut evidence_types: BTreeSet<String> = BTreeSet::new();
    let mut cross_workflow_opportunities = Vec::new();

    for doc in &candidate_docs {
        for drug in &doc.metadata.drug_names_context {
            if drug != &query.drug {
                similar_drugs.insert(drug.clone());
            }
        }
        evidence_types.insert(doc.metadata.document_type.as_tag());
        if doc.metadata.reference_count() >= 2 {
            cross_workflow_opportunities.push(doc.canonical_id.clone());
        }
    }

    let total_matched = candidates.len();
    let similar_drug_count = similar_drugs.len();
    let is_sglt2_like = SGLT2_LIKE.contains(&query.drug.to_lowercase().as_str())
        || query
            .drug_class
            .as_ref()
            .map(|c| c.to_lowercase().contains("sglt2"))
            .unwrap_or(false);

    let mut scores: BTreeMap<ResearchStrategy, f64> = BTreeMap::new();
    for strategy in [ResearchStrategy::Comprehensive, ResearchStrategy::Focused, ResearchStrategy::Update] {
        scores.insert(strategy, 0.0);
    }
    let mut add = |strategy: ResearchStrategy, amount: f64| {
        *scores.get_mut(&strategy).unwrap() += amount;
    };

    if total_matched >= 15 {
        add(ResearchStrategy::Update, 0.4);
        add(ResearchStrategy::Focused, 0.3);
    } else if total_matched >= 5 {
        add(ResearchStrategy::Focused, 0.4);
        add(ResearchStrategy::Update, 0.2);
    } else {
        add(ResearchStrategy::Comprehensive, 0.5);
    }

    if similar_drug_count >= 3 {
        add(ResearchStrategy::Focused, 0.4);
        add(ResearchStrategy::Update, 0.3);
    } else if similar_drug_count >= 1 {
        add(ResearchStrategy::Focused, 0.3);
        add(ResearchStrategy::Update, 0.2);
    }

    if best_distance <= 0.12 {
        add(ResearchStrategy::Update, 0.3);
    } else if best_distance <= 0.20 {
        add(ResearchStrategy::Focused, 0.3);
    } else if best_distance > 0.40 {
        add(ResearchStrategy::Comprehensive, 0.2);
    }

    if is_sglt2_like && similar_drug_count >= 2 {
        add(ResearchStrategy::Focused, 0.2);
        add(ResearchStrategy::Update, 0.1);
    }

    if evidence_types.len() >= 3 {
        add(ResearchStrategy::Update, 0.1);
    }

    let (winning_strategy, winning_score) = [ResearchStrategy::Comprehensive, ResearchStrategy::Focused, ResearchStrategy::Update]
        .into_iter()
        .map(|s| (s, scores[&s]))
        .fold((ResearchStrategy::Comprehensive, f64::MIN), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    let confidence: f64 = (0.5 + winning_score).min(0.95);

    let all_types = [DocumentType::Guideline, DocumentType::PubmedArticle, DocumentType::WorkflowSummary];
    let gap_addressing: Vec<String> = all_types
        .iter()
        .filter(|t| !evidence_types.contains(&t.as_tag()))
        .map(|t| format!("no {} evidence found for {}", t.as_tag(), query.drug))
        .collect();

    let priority_research: Vec<String> = weak_angles
        .into_iter()
        .map(|angle| format!("investigate {angle} evidence for {}", query.drug))
        .collect();

    ResearchRecommendation {
        strategy: winning_strategy,
        existing_evidence: candidates.clone(),
        similar_drugs: similar_drugs.into_iter().collect(),
        related_documents: candidates,
        priority_research,
        gap_addressing,
        cross_workflow_opportunities,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn collection_with_sglt2_evidence() -> DocumentCollection {
        let collection = DocumentCollection::new();
        collection.upsert_workflow_outputs(
            "workflow-1",
            "evaluate empagliflozin",
            vec![(
                "guideline".to_string(),
                "ada-2024".to_string(),
                "empagliflozin dapagliflozin are first-line recommended for type 2 diabetes".to_string(),
            )],
            vec![],
            None,
            Utc::now(),
        );
        collection
    }

    #[test]
    fn recommends_a_strategy_with_bounded_confidence() {
        let collection = collection_with_sglt2_evidence();
        let query = ResearchQuery {
            drug: "empagliflozin".to_string(),
            drug_class: Some("SGLT2 inhibitor".to_string()),
            mechanism_query: Some("sodium glucose cotransporter".to_string()),
            indication_query: Some("type 2 diabetes".to_string()),
        };
        let recommendation = research_recommendations(&collection, &query);
        assert!(recommendation.confidence >= 0.5 && recommendation.confidence <= 0.95);
    }

    #[test]
    fn sparse_evidence_favors_comprehensive_strategy() {
        let collection = DocumentCollection::new();
        let query = ResearchQuery {
            drug: "empagliflozin".to_string(),
            drug_class: None,
            mechanism_query: None,
            indication_query: None,
        };
        let recommendation = research_recommendations(&collection, &query);
        assert_eq!(recommendation.strategy, ResearchStrategy::Comprehensive);
    }
}
