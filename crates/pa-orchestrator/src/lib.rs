//! # pa-orchestrator
//!
//! The PA Orchestrator (§4.5): end-to-end `predict_approval_likelihood`
//! flow over the specialist services, evidence engine, and synthesizer
//! pipeline, plus the cache, metrics, and task registry that sit around it.

pub mod alternatives;
pub mod cache;
pub mod gather;
pub mod metrics;
pub mod orchestrator;
pub mod recommendations;
pub mod registry;

pub use gather::INTERNAL_ROLE;
pub use orchestrator::PaOrchestrator;
