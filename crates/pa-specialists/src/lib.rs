//! # pa-specialists
//!
//! Mock-data-backed implementations of the `pa-core` specialist service
//! traits: `PatientService`, `DrugService`, `PolicyService`, and
//! `GuidelineService` (§4.2). All data is hardcoded and fictional — no
//! external systems are contacted, consistent with the orchestrator's
//! "out of scope: live EHR/payer/pharmacy integrations" boundary.
//!
//! Name normalization (§4.2.1) is shared across every service via
//! [`normalize`].

pub mod cache;
pub mod drug_service;
pub mod guideline_service;
pub mod mock_data;
pub mod normalize;
pub mod patient_service;
pub mod policy_service;

pub use drug_service::MockDrugService;
pub use guideline_service::MockGuidelineService;
pub use patient_service::MockPatientService;
pub use policy_service::MockPolicyService;
