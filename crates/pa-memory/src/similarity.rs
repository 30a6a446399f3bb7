//! Deterministic similarity scoring (§4.1 failure semantics): there is no
//! embedding backend in this workspace, so `token_distance` stands in as the
//! "missing embedding backend degrades to a deterministic default similarity"
//! case permanently rather than as a fallback path — every search in this
//! crate runs through it, which keeps the rest of the system testable
//! offline without a conditional degrade branch to maintain.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// `1 - Jaccard(tokens(a), tokens(b))`, in `[0, 1]`. Two empty token sets are
/// treated as maximally dissimilar (distance `1.0`) rather than dividing by
/// zero.
pub fn token_distance(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() || tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        1.0
    } else {
        1.0 - (intersection as f64 / union as f64)
    }
}

/// Monotonic recency factor in `[0, 1]`: `1.0` for a document seen just now,
/// decaying linearly to `0.0` by one year old.
pub fn recency_factor(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - last_seen).num_days().max(0) as f64;
    (1.0 - age_days / 365.0).clamp(0.0, 1.0)
}

/// `cosine_distance * (1 - recency_weight * recency_factor)` (§4.1).
pub fn adjusted_distance(base_distance: f64, recency_weight: f64, recency_factor: f64) -> f64 {
    base_distance * (1.0 - recency_weight * recency_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn identical_text_has_zero_distance() {
        assert_eq!(token_distance("empagliflozin type 2 diabetes", "empagliflozin type 2 diabetes"), 0.0);
    }

    #[test]
    fn disjoint_text_has_max_distance() {
        assert_eq!(token_distance("empagliflozin", "warfarin aspirin"), 1.0);
    }

    #[test]
    fn recency_factor_decays_to_zero_after_a_year() {
        let now = Utc::now();
        assert_eq!(recency_factor(now, now), 1.0);
        assert_eq!(recency_factor(now - Duration::days(400), now), 0.0);
    }

    #[test]
    fn recency_weight_shrinks_distance_for_recent_documents() {
        let adjusted = adjusted_distance(0.5, 0.5, 1.0);
        assert_eq!(adjusted, 0.25);
    }
}
