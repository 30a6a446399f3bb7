//! Detects truncated LLM responses so the pipeline can issue a continuation
//! request rather than accept a cut-off answer (§4.4).

const TRUNCATION_MARKERS: [&str; 3] = ["...", "(continued)", "[truncated]"];
const MIN_RESPONSE_LEN: usize = 50;

pub fn is_incomplete(response: &str) -> bool {
    let trimmed = response.trim();

    if trimmed.len() < MIN_RESPONSE_LEN {
        return true;
    }

    if TRUNCATION_MARKERS.iter().any(|marker| trimmed.ends_with(marker)) {
        return true;
    }

    let fence_count = trimmed.matches("```").count();
    if fence_count % 2 != 0 {
        return true;
    }

    false
}

/// Joins a response with its continuation, separated by a blank line.
pub fn join_continuation(response: &str, continuation: &str) -> String {
    format!("{}\n\n{}", response.trim_end(), continuation.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_response_is_incomplete() {
        assert!(is_incomplete("too short"));
    }

    #[test]
    fn ellipsis_ending_is_incomplete() {
        let response = "This is a long enough response that ends abruptly...";
        assert!(is_incomplete(response));
    }

    #[test]
    fn odd_fence_count_is_incomplete() {
        let response = "Here is a long enough json response that has an open fence ```json{\"a\":1}";
        assert!(is_incomplete(response));
    }

    #[test]
    fn complete_response_is_not_incomplete() {
        let response = "{\"approval_likelihood_percent\": 80, \"decision_prediction\": \"Approve\", \"confidence_score\": 0.8, \"clinical_rationale\": \"sufficient evidence of medical necessity documented\"}";
        assert!(!is_incomplete(response));
    }

    #[test]
    fn join_continuation_separates_with_blank_line() {
        let joined = join_continuation("part one", "part two");
        assert_eq!(joined, "part one\n\npart two");
    }
}
