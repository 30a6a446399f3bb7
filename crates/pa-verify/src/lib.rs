//! # pa-verify
//!
//! Output verification for synthesizer decisions.
//!
//! [`engine::SchemaVerifier`] validates a candidate decision payload (raw
//! `serde_json::Value`) in two phases:
//!
//! 1. **Structural** — JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic** — domain rules (`RequiredField`, `AllowedValues`,
//!    `NumericRange`, `ForbiddenPattern`, `Custom`) evaluated against the
//!    payload.
//!
//! [`engine::decision_output_schema`] builds the default schema every
//! synthesizer candidate is checked against before being returned to a
//! caller (§4.4 "Output validation").
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pa_verify::engine::{SchemaVerifier, decision_output_schema, rationale_non_empty_rule};
//!
//! let mut verifier = SchemaVerifier::new();
//! verifier.register_rule("rationale_non_empty", rationale_non_empty_rule());
//! let report = verifier.verify(&candidate_json, &decision_output_schema());
//! ```

pub mod engine;
