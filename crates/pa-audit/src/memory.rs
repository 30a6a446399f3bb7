//! In-memory, hash-chained audit trail.
//!
//! `InMemoryAuditWriter` keeps all entries in a `Vec` protected by a
//! `Mutex`, making it safe to share across the orchestrator's concurrent
//! gather tasks via `Arc`. Never held across an `.await` point.
//!
//! Use `export_log()` after a decision finalizes to obtain a sealed
//! `AuditLog`, and `verify_integrity()` at any time to confirm the chain
//! has not been tampered with in memory.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use pa_contracts::analysis::AuditEntry;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

/// The mutable interior of an `InMemoryAuditWriter`.
pub(crate) struct InMemoryState {
    pub(crate) entries: Vec<AuditEvent>,
    pub(crate) sequence: u64,
    pub(crate) last_hash: String,
}

/// An in-memory, append-only audit writer backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// `write()` and `finalize()` both acquire a `Mutex` internally. Multiple
/// threads may hold clones of the `Arc<Mutex<InMemoryState>>` without
/// additional synchronization.
#[derive(Clone)]
pub struct InMemoryAuditWriter {
    decision_id: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    /// Create a new writer for the given decision.
    pub fn new(decision_id: impl Into<String>) -> Self {
        let decision_id = decision_id.into();
        let state = InMemoryState {
            entries: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        };
        Self {
            decision_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Append one audit entry to the hash chain.
    pub fn write(&self, entry: &AuditEntry) {
        let mut state = self.state.lock().expect("audit state lock poisoned");

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;

        let this_hash = hash_event(&self.decision_id, sequence, entry, &prev_hash);

        let event = AuditEvent {
            sequence,
            decision_id: self.decision_id.clone(),
            entry: entry.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        };

        state.entries.push(event);
        state.sequence += 1;
        state.last_hash = this_hash;
    }

    /// Mark the decision as complete in the audit log.
    pub fn finalize(&self) {
        let state = self.state.lock().expect("audit state lock poisoned");
        info!(
            decision_id = %self.decision_id,
            event_count = state.entries.len(),
            terminal_hash = %state.last_hash,
            "audit log finalized"
        );
    }

    /// Export a sealed `AuditLog` containing all events written so far.
    pub fn export_log(&self) -> AuditLog {
        let state = self.state.lock().expect("audit state lock poisoned");
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AuditLog {
            decision_id: self.decision_id.clone(),
            events: state.entries.clone(),
            finalized_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().expect("audit state lock poisoned");
        verify_chain(&state.entries)
    }

    /// All entries written so far, in append order (§3 `AnalysisResult.audit_trail`).
    pub fn entries(&self) -> Vec<AuditEntry> {
        let state = self.state.lock().expect("audit state lock poisoned");
        state.entries.iter().map(|e| e.entry.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::InMemoryAuditWriter;
    use pa_contracts::analysis::AuditEntry;
    use super::AuditEvent;

    fn make_entry(action: &str, details: &str) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            action: action.to_string(),
            details: details.to_string(),
            agent_id: "pa-orchestrator".to_string(),
        }
    }

    #[test]
    fn test_hash_chain_integrity() {
        let writer = InMemoryAuditWriter::new("PA_p_drug_1");
        writer.write(&make_entry("patient_lookup", "first"));
        writer.write(&make_entry("drug_lookup", "second"));
        writer.write(&make_entry("policy_check", "third"));

        assert!(writer.verify_integrity(), "chain must be valid after sequential writes");
    }

    #[test]
    fn test_tamper_detection() {
        let writer = InMemoryAuditWriter::new("PA_p_drug_2");
        writer.write(&make_entry("a", "step-a"));
        writer.write(&make_entry("b", "step-b"));

        {
            let mut state = writer.state.lock().unwrap();
            state.entries[0].entry.details = "TAMPERED".to_string();
        }

        assert!(
            !writer.verify_integrity(),
            "chain must detect tampering with a stored event"
        );
    }

    #[test]
    fn test_genesis_hash() {
        let writer = InMemoryAuditWriter::new("PA_p_drug_3");
        writer.write(&make_entry("a", "first"));

        let log = writer.export_log();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].prev_hash, AuditEvent::GENESIS_HASH);
    }

    #[test]
    fn test_export_log() {
        let writer = InMemoryAuditWriter::new("PA_p_drug_4");
        writer.write(&make_entry("a", "alpha"));
        writer.write(&make_entry("b", "beta"));

        let log = writer.export_log();
        assert_eq!(log.events.len(), 2);
        assert_eq!(log.terminal_hash, log.events.last().unwrap().this_hash);
        assert!(super::verify_chain(&log.events));
    }

    #[test]
    fn test_verify_empty() {
        let writer = InMemoryAuditWriter::new("PA_p_drug_5");
        assert!(writer.verify_integrity());
    }
}
