//! Runtime error taxonomy for the PA decision orchestrator.
//!
//! All fallible operations return `PaResult<T>`. Variants mirror the
//! taxonomy: validation errors retry at the caller, not-found and forbidden
//! are non-error completions, transient backend failures are absorbed
//! locally, and only `Fatal` surfaces as a failed response.

use thiserror::Error;

/// The unified error type for the PA orchestrator runtime.
#[derive(Debug, Error)]
pub enum PaError {
    /// Missing or malformed input. Surfaced as `RETRY` with a `missing` list;
    /// the core never retries on the caller's behalf.
    #[error("validation failed: missing fields {missing:?}")]
    Validation { missing: Vec<String> },

    /// The requested entity does not exist. Non-error completion.
    #[error("not found: {entity} '{id}'")]
    NotFound { entity: String, id: String },

    /// The caller's role lacks permission for the requested operation.
    /// Non-retryable.
    #[error("role '{role}' is not permitted to perform '{operation}'")]
    Forbidden { role: String, operation: String },

    /// A specialist or synthesizer call failed or timed out. Handled
    /// locally by fallback or default; never fatal to the request.
    #[error("transient backend failure in '{service}': {reason}")]
    TransientBackend { service: String, reason: String },

    /// The orchestrator could not assemble a minimally valid context
    /// (e.g. no patient record at all). Surfaced as `FAILED`.
    #[error("fatal: {reason}")]
    Fatal { reason: String },

    /// A JSON Schema or semantic verification check failed.
    #[error("verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl PaError {
    /// True for errors the orchestrator treats as fatal to the whole request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PaError::Fatal { .. })
    }
}

/// Convenience alias used throughout the PA crates.
pub type PaResult<T> = Result<T, PaError>;
