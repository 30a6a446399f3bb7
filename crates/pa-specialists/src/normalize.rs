//! Name normalization shared by every specialist service (§4.2.1).
//!
//! Drug names: lowercase, trim, map known trade→generic synonyms, then strip
//! at most one suffix from an ordered list (longest match wins).
//!
//! Task names: lowercase, trim, then map known literal synonyms and two
//! dynamically-named regex families onto their canonical task name.

use std::sync::OnceLock;

use regex::Regex;

/// Trade→generic synonym table, seeded with the mappings the drug lookup
/// fallback actually relies on.
const DRUG_SYNONYMS: &[(&str, &str)] = &[
    ("jardiance", "empagliflozin"),
    ("farxiga", "dapagliflozin"),
    ("glucophage", "metformin"),
    ("ozempic", "semaglutide"),
    ("trulicity", "dulaglutide"),
    ("lasix", "furosemide"),
    ("zestril", "lisinopril"),
    ("prinivil", "lisinopril"),
    ("coumadin", "warfarin"),
    ("glucotrol", "glipizide"),
];

/// Suffixes stripped from a normalized drug name, longest match first so a
/// name like "metformin extended release" doesn't get double-stripped by a
/// shorter prefix of a longer suffix.
const SUFFIXES: &[&str] = &[
    " hydrochloride",
    " extended release",
    " sustained release",
    " immediate release",
    " long acting",
    " potassium",
    " sodium",
    " hcl",
    " er",
    " xr",
    " sr",
    " la",
    " ir",
];

/// Normalize a drug name per §4.2.1: lowercase, trim, synonym substitution,
/// then strip at most one suffix (longest match wins).
pub fn normalize_drug_name(raw: &str) -> String {
    let mut name = raw.trim().to_lowercase();

    if let Some((_, generic)) = DRUG_SYNONYMS.iter().find(|(trade, _)| *trade == name) {
        name = generic.to_string();
    }

    let mut sorted_suffixes: Vec<&&str> = SUFFIXES.iter().collect();
    sorted_suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));

    for suffix in sorted_suffixes {
        if name.ends_with(suffix) {
            name.truncate(name.len() - suffix.len());
            break;
        }
    }

    name.trim().to_string()
}

const TASK_SYNONYMS: &[(&str, &str)] = &[
    ("lookup_drug_info", "get_drug_info"),
    ("fetch_patient_record", "get_patient_record"),
    ("retrieve_patient", "get_patient_record"),
    ("check_interactions", "check_drug_interactions"),
];

fn retrieve_policy_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^retrieve_insurance_policy_for_.+$").expect("valid regex"))
}

fn evaluate_criteria_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^evaluate_if_patient_meets_pa_criteria_for_.+$").expect("valid regex")
    })
}

/// Normalize a task name per §4.2.1: lowercase, trim, literal synonym
/// substitution, then dynamic-pattern substitution for the two named regex
/// families.
pub fn normalize_task_name(raw: &str) -> String {
    let name = raw.trim().to_lowercase();

    if let Some((_, canonical)) = TASK_SYNONYMS.iter().find(|(syn, _)| *syn == name) {
        return canonical.to_string();
    }
    if retrieve_policy_regex().is_match(&name) {
        return "get_policy_for_drug".to_string();
    }
    if evaluate_criteria_regex().is_match(&name) {
        return "check_coverage_criteria".to_string();
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trade_name_synonym() {
        assert_eq!(normalize_drug_name("Jardiance"), "empagliflozin");
    }

    #[test]
    fn strips_longest_matching_suffix() {
        assert_eq!(normalize_drug_name("Metformin Extended Release"), "metformin");
    }

    #[test]
    fn strips_suffix_only_once() {
        // "sr" is a suffix of the (already-stripped) remainder; should not
        // be stripped twice.
        assert_eq!(normalize_drug_name("Glipizide XR"), "glipizide");
    }

    #[test]
    fn leaves_unknown_names_as_lowercased_trim() {
        assert_eq!(normalize_drug_name("  Atorvastatin  "), "atorvastatin");
    }

    #[test]
    fn dynamic_policy_task_name_normalizes() {
        assert_eq!(
            normalize_task_name("retrieve_insurance_policy_for_empagliflozin"),
            "get_policy_for_drug"
        );
    }

    #[test]
    fn dynamic_criteria_task_name_normalizes() {
        assert_eq!(
            normalize_task_name("evaluate_if_patient_meets_pa_criteria_for_empagliflozin"),
            "check_coverage_criteria"
        );
    }

    #[test]
    fn literal_task_synonym_normalizes() {
        assert_eq!(normalize_task_name("Fetch_Patient_Record"), "get_patient_record");
    }

    #[test]
    fn check_interactions_synonym_normalizes_to_canonical_name() {
        assert_eq!(normalize_task_name("check_interactions"), "check_drug_interactions");
    }

    #[test]
    fn already_canonical_interactions_name_is_unchanged() {
        assert_eq!(normalize_task_name("check_drug_interactions"), "check_drug_interactions");
    }
}
