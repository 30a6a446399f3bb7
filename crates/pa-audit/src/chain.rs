//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. decision_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of entry (serde_json with no pretty-printing)

use sha2::{Digest, Sha256};

use pa_contracts::analysis::AuditEntry;

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single audit event.
///
/// The hash commits to every field that uniquely identifies an event: its
/// position in the chain (`sequence`), the decision it belongs to
/// (`decision_id`), its link to the previous event (`prev_hash`), and the
/// full audit entry (`entry`).
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `entry` cannot be serialized to JSON — which cannot happen for
/// the well-formed `AuditEntry` type.
pub fn hash_event(decision_id: &str, sequence: u64, entry: &AuditEntry, prev_hash: &str) -> String {
    let entry_json =
        serde_json::to_vec(entry).expect("AuditEntry must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(decision_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&entry_json);

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a hash chain.
///
/// Returns `true` when the chain is valid according to both rules:
///
/// 1. **Prev-hash linkage** — each event's `prev_hash` equals the
///    `this_hash` of the preceding event (or `GENESIS_HASH` for event 0).
/// 2. **Hash correctness** — each event's `this_hash` matches the value
///    recomputed from its own fields.
///
/// Returns `false` the moment any mismatch is detected. An empty chain is
/// defined as valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for event in events {
        if event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_event(&event.decision_id, event.sequence, &event.entry, &event.prev_hash);
        if event.this_hash != recomputed {
            return false;
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
