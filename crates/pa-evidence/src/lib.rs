//! # pa-evidence
//!
//! The evidence engine (§4.3): turns an `AnalysisContext` into an ordered
//! sequence of `EvidenceItem`s plus a weighted preliminary approval score
//! and a confidence score over that evidence.

pub mod clinical_appropriateness;
pub mod drug_safety;
pub mod engine;
pub mod guideline;
pub mod interaction;
pub mod patient_history;
pub mod policy_criteria;
pub mod weights;

pub use engine::{assess, EvidenceAssessment};
