//! # pa-synthesizer
//!
//! Prompt construction and decision synthesis (§4.4): turns an evidence
//! assessment into a structured decision via a deterministic mock LLM
//! client, with primary -> fallback -> rule-based degradation and schema
//! verification of every candidate before it is accepted.

pub mod incompleteness;
pub mod mock;
pub mod pipeline;
pub mod prompt;

pub use pipeline::SynthesizerPipeline;
