//! Guideline-support evidence (§4.3): NLP-style keyword matching over the
//! top 3 guidelines, weight split evenly across however many contribute.

use pa_contracts::analysis::GuidelineSnippet;
use pa_contracts::evidence::{EvidenceItem, EvidenceType};
use pa_contracts::keywords::count_terms;

const MAX_GUIDELINES_CONSIDERED: usize = 3;

/// Guideline text is truncated to this length when it enters an evidence
/// item (§4.2.5) — tighter than `EvidenceItem`'s generic 200-char clamp,
/// since guideline snippets are quoted verbatim and tend to run long.
const MAX_GUIDELINE_TEXT_CHARS: usize = 150;

fn truncate_guideline_text(text: &str) -> String {
    if text.chars().count() > MAX_GUIDELINE_TEXT_CHARS {
        text.chars().take(MAX_GUIDELINE_TEXT_CHARS).collect()
    } else {
        text.to_string()
    }
}

pub fn guideline_support_evidence(guidelines: &[GuidelineSnippet], category_weight: f64) -> Vec<EvidenceItem> {
    let considered: Vec<&GuidelineSnippet> = guidelines.iter().take(MAX_GUIDELINES_CONSIDERED).collect();
    if considered.is_empty() {
        return vec![];
    }
    let per_item_weight = category_weight / considered.len() as f64;

    considered
        .into_iter()
        .enumerate()
        .map(|(i, guideline)| {
            let text = guideline.text.to_lowercase();
            let (positive, negative) = count_terms(&text);
            let net_score = positive as i64 - negative as i64;
            let supports = net_score > 0;

            let text_len = text.split_whitespace().count().max(1);
            let keyword_density = (positive + negative) as f64 / text_len as f64;
            let confidence = (guideline.relevance_score * (1.0 + keyword_density)).min(0.95);

            let source = if guideline.source.is_empty() {
                format!("guideline_{}", i + 1)
            } else {
                guideline.source.clone()
            };

            EvidenceItem::new(
                source,
                EvidenceType::GuidelineSupport,
                truncate_guideline_text(&guideline.text),
                per_item_weight,
                supports,
                confidence,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(text: &str, relevance: f64) -> GuidelineSnippet {
        GuidelineSnippet {
            text: text.to_string(),
            relevance_score: relevance,
            source: "ADA 2024".to_string(),
            year: 2024,
        }
    }

    #[test]
    fn positive_keyword_majority_supports_approval() {
        let evidence = guideline_support_evidence(&[snippet("first-line recommended and effective", 0.9)], 0.25);
        assert_eq!(evidence.len(), 1);
        assert!(evidence[0].supports_approval);
    }

    #[test]
    fn negative_keyword_majority_opposes_approval() {
        let evidence = guideline_support_evidence(&[snippet("contraindicated, avoid use, caution", 0.9)], 0.25);
        assert!(!evidence[0].supports_approval);
    }

    #[test]
    fn weight_is_split_across_considered_guidelines() {
        let evidence = guideline_support_evidence(
            &[snippet("recommended", 0.8), snippet("preferred", 0.8)],
            0.25,
        );
        assert_eq!(evidence.len(), 2);
        assert!((evidence[0].weight - 0.125).abs() < 1e-9);
    }

    #[test]
    fn no_guidelines_yields_no_evidence() {
        assert!(guideline_support_evidence(&[], 0.25).is_empty());
    }

    #[test]
    fn long_guideline_text_is_clamped_to_150_chars() {
        let long_text = "recommended ".repeat(20);
        assert!(long_text.chars().count() > 150);
        let evidence = guideline_support_evidence(&[snippet(&long_text, 0.8)], 0.25);
        assert_eq!(evidence[0].content.chars().count(), 150);
    }
}
