//! Heuristic drug/disease mention extraction for documents that don't carry
//! structured entity tags (§4.1) — a stand-in for the embedding/NER backend
//! named out of scope, so `upsert_workflow_outputs` can still populate
//! `drug_names_context`/`disease_names_context` from free text deterministically.

use std::collections::BTreeSet;

/// Generic drug names the mock knowledge base recognizes. Kept independent
/// of `pa-specialists::normalize` so this crate has no upward dependency on
/// the specialist layer.
const KNOWN_DRUGS: &[&str] = &[
    "empagliflozin",
    "metformin",
    "warfarin",
    "aspirin",
    "lisinopril",
    "amoxicillin",
    "ibuprofen",
    "dapagliflozin",
    "canagliflozin",
    "ertugliflozin",
];

const KNOWN_DISEASE_TERMS: &[&str] = &[
    "type 2 diabetes",
    "diabetes mellitus",
    "hypertension",
    "atrial fibrillation",
    "chronic kidney disease",
    "heart failure",
];

pub fn extract_drugs(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    KNOWN_DRUGS
        .iter()
        .filter(|drug| lower.contains(*drug))
        .map(|drug| drug.to_string())
        .collect()
}

pub fn extract_diseases(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    KNOWN_DISEASE_TERMS
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_known_drug_mentions() {
        let found = extract_drugs("Patient tolerated empagliflozin well, continue metformin.");
        assert!(found.contains("empagliflozin"));
        assert!(found.contains("metformin"));
    }

    #[test]
    fn extracts_known_disease_mentions() {
        let found = extract_diseases("History of type 2 diabetes and hypertension.");
        assert_eq!(found.len(), 2);
    }
}
