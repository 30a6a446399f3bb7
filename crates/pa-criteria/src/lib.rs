//! # pa-criteria
//!
//! The deterministic, rule-based coverage criteria evaluator (§4.2.4).
//!
//! [`CriteriaEngine::check_coverage`] evaluates a patient record against an
//! insurer policy's criteria and returns a [`pa_contracts::policy::CoverageDecision`].
//! Every criterion kind is handled by a pure function in [`handlers`]; no
//! randomness, no I/O — identical inputs always produce identical output
//! (§8 property 4).

pub mod engine;
pub mod handlers;

pub use engine::CriteriaEngine;
