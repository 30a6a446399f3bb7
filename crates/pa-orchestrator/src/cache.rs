//! Result cache, keyed by `SHA-256(patient_id ‖ ":" ‖ lower(drug_name) ‖ ":" ‖ insurer_id)`
//! (§4.5 step 1). Reuses `pa_specialists::cache::TtlLruCache`, which already
//! deep-copies on read and evicts least-recently-inserted entries once full
//! (§5 backpressure).

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use pa_contracts::analysis::AnalysisResult;
use pa_specialists::cache::TtlLruCache;

/// A cached decision is invalidated when the referenced patient record's
/// `last_updated` moved within this window (§3 lifecycles), regardless of
/// the cache's own TTL.
pub const PATIENT_INVALIDATION_WINDOW_SECONDS: i64 = 60;

/// True when `last_updated` falls within the invalidation window measured
/// from `now` — i.e. the patient record changed too recently to trust a
/// cached decision computed against its old state.
pub fn patient_updated_recently(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let age_seconds = (now - last_updated).num_seconds();
    (0..PATIENT_INVALIDATION_WINDOW_SECONDS).contains(&age_seconds)
}

pub fn cache_key(patient_id: &str, drug_name: &str, insurer_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(patient_id.as_bytes());
    hasher.update(b":");
    hasher.update(drug_name.to_lowercase().as_bytes());
    hasher.update(b":");
    hasher.update(insurer_id.as_bytes());
    hex::encode(hasher.finalize())
}

pub type ResultCache = TtlLruCache<AnalysisResult>;

pub fn new_result_cache(max_size: usize, ttl_seconds: u64) -> ResultCache {
    TtlLruCache::new(max_size, std::time::Duration::from_secs(ttl_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_case_insensitive_on_drug_name() {
        let a = cache_key("patient-001", "Empagliflozin", "uhc");
        let b = cache_key("patient-001", "empagliflozin", "uhc");
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_differs_on_insurer() {
        let a = cache_key("patient-001", "empagliflozin", "uhc");
        let b = cache_key("patient-001", "empagliflozin", "aetna");
        assert_ne!(a, b);
    }

    #[test]
    fn patient_updated_within_window_is_flagged() {
        let now = Utc::now();
        assert!(patient_updated_recently(now - chrono::Duration::seconds(30), now));
    }

    #[test]
    fn patient_updated_outside_window_is_not_flagged() {
        let now = Utc::now();
        assert!(!patient_updated_recently(now - chrono::Duration::seconds(120), now));
    }
}
