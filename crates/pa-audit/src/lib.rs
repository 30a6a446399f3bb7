//! # pa-audit
//!
//! Immutable, append-only, SHA-256 hash-chained audit trail for the PA
//! decision orchestrator, plus the process-shared token-bucket rate
//! limiter used by specialist services (§4.2.3).
//!
//! ## Overview
//!
//! Every step the orchestrator records is wrapped in an `AuditEvent` that
//! links to the previous event via its SHA-256 hash. Tampering with any
//! event — even a single byte — breaks the chain and is detected by
//! `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pa_audit::InMemoryAuditWriter;
//! use pa_contracts::analysis::AuditEntry;
//!
//! let writer = InMemoryAuditWriter::new("PA_patient-001_empagliflozin_1700000000");
//! writer.write(&entry);
//! writer.finalize();
//!
//! assert!(writer.verify_integrity());
//! let log = writer.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod memory;
pub mod rate_limit;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;
pub use rate_limit::RateLimiter;
