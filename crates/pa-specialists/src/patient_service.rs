//! Mock-data-backed `PatientService` (§4.2.2).
//!
//! State (chart store, audit log, consent flags) lives behind a
//! `std::sync::Mutex`, never held across an `.await` point, matching the
//! concurrency model every shared resource in this workspace follows.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use pa_contracts::error::{PaError, PaResult};
use pa_contracts::patient::{
    FilteredPatientRecord, PatientRecord, PatientSearchHit, Role, SearchCriteria,
};
use pa_core::traits::PatientService;

use crate::mock_data;

const MAX_AUDIT_LOG: usize = 10_000;
const AUDIT_LOG_RETENTION: usize = 5_000;
const FLUSH_THROTTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AuditLogEntry {
    pub patient_id: String,
    pub action: String,
    pub user_id: Option<String>,
    pub timestamp: chrono::DateTime<Utc>,
}

struct State {
    records: BTreeMap<String, PatientRecord>,
    audit_log: Vec<AuditLogEntry>,
    consent: BTreeMap<String, bool>,
    last_flush: Option<Instant>,
    pending_flush: bool,
}

/// Mock `PatientService`. Seeds its chart store from `mock_data::patient_record`
/// on first miss so the demo and tests can reference `patient-001` /
/// `patient-002` without separate setup.
pub struct MockPatientService {
    state: Arc<Mutex<State>>,
}

impl Default for MockPatientService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPatientService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                records: BTreeMap::new(),
                audit_log: Vec::new(),
                consent: BTreeMap::new(),
                last_flush: None,
                pending_flush: false,
            })),
        }
    }

    fn load_record(&self, patient_id: &str) -> Option<PatientRecord> {
        let mut state = self.state.lock().expect("patient service lock poisoned");
        if let Some(r) = state.records.get(patient_id) {
            return Some(r.clone());
        }
        let seeded = mock_data::patient_record(patient_id)?;
        state.records.insert(patient_id.to_string(), seeded.clone());
        Some(seeded)
    }

    fn record_audit(&self, patient_id: &str, action: &str) {
        let mut state = self.state.lock().expect("patient service lock poisoned");
        state.audit_log.push(AuditLogEntry {
            patient_id: patient_id.to_string(),
            action: action.to_string(),
            user_id: None,
            timestamp: Utc::now(),
        });
        if state.audit_log.len() > MAX_AUDIT_LOG {
            let drop = state.audit_log.len() - AUDIT_LOG_RETENTION;
            state.audit_log.drain(0..drop);
        }
        self.maybe_flush(&mut state);
    }

    /// Persistence throttling (§4.2.2): at most one flush per `FLUSH_THROTTLE`.
    fn maybe_flush(&self, state: &mut State) {
        let should_flush_now = state
            .last_flush
            .map(|t| t.elapsed() >= FLUSH_THROTTLE)
            .unwrap_or(true);
        if should_flush_now {
            debug!(entries = state.audit_log.len(), "flushing patient audit log");
            state.last_flush = Some(Instant::now());
            state.pending_flush = false;
        } else {
            state.pending_flush = true;
        }
    }

    /// Deterministic 8-hex truncation of a SHA-256 digest of the patient id,
    /// used to anonymize `patient_id` for the `researcher` role (§4.2.2).
    fn anonymized_id(patient_id: &str) -> String {
        let digest = Sha256::digest(patient_id.as_bytes());
        hex::encode(digest)[..8].to_string()
    }

    fn filter_for_role(record: &PatientRecord, role: Role) -> FilteredPatientRecord {
        if role.is_researcher() {
            FilteredPatientRecord {
                patient_id: Self::anonymized_id(&record.patient_id),
                age: record.age,
                gender: record.gender.clone(),
                diagnoses_icd10: record.diagnoses_icd10.clone(),
                medication_history: record.medication_history.clone(),
                labs: record.labs.clone(),
                notes: record.notes.clone(),
                provider_type: record.provider_type.clone(),
                adherence_score: record.adherence_score,
                requested_quantity: record.requested_quantity,
                last_updated: record.last_updated,
            }
        } else {
            FilteredPatientRecord {
                patient_id: record.patient_id.clone(),
                age: record.age,
                gender: record.gender.clone(),
                diagnoses_icd10: record.diagnoses_icd10.clone(),
                medication_history: record.medication_history.clone(),
                labs: record.labs.clone(),
                notes: record.notes.clone(),
                provider_type: record.provider_type.clone(),
                adherence_score: record.adherence_score,
                requested_quantity: record.requested_quantity,
                last_updated: record.last_updated,
            }
        }
    }
}

#[async_trait]
impl PatientService for MockPatientService {
    async fn get(&self, patient_id: &str, role: Role) -> PaResult<FilteredPatientRecord> {
        if !role.can("read") {
            warn!(?role, patient_id, "read denied");
            return Err(PaError::Forbidden {
                role: format!("{role:?}"),
                operation: "read".to_string(),
            });
        }
        let record = self.load_record(patient_id).ok_or_else(|| PaError::NotFound {
            entity: "patient".to_string(),
            id: patient_id.to_string(),
        })?;
        self.record_audit(patient_id, "get");
        Ok(Self::filter_for_role(&record, role))
    }

    async fn get_raw(&self, patient_id: &str) -> PaResult<PatientRecord> {
        self.load_record(patient_id).ok_or_else(|| PaError::NotFound {
            entity: "patient".to_string(),
            id: patient_id.to_string(),
        })
    }

    async fn search(
        &self,
        criteria: SearchCriteria,
        page: u32,
        page_size: u32,
        role: Role,
    ) -> PaResult<(Vec<PatientSearchHit>, u32)> {
        if !role.can("search") {
            return Err(PaError::Forbidden {
                role: format!("{role:?}"),
                operation: "search".to_string(),
            });
        }

        let state = self.state.lock().expect("patient service lock poisoned");
        let mut hits: Vec<PatientSearchHit> = state
            .records
            .values()
            .filter_map(|record| score_match(record, &criteria).map(|score| (record.clone(), score)))
            .map(|(record, score)| PatientSearchHit {
                record: Self::filter_for_role(&record, role),
                match_score: score,
            })
            .collect();
        drop(state);

        hits.sort_by(|a, b| b.match_score.partial_cmp(&a.match_score).unwrap());
        let total = hits.len() as u32;
        let start = (page.saturating_sub(1) * page_size) as usize;
        let page_hits = hits.into_iter().skip(start).take(page_size as usize).collect();

        self.record_audit("*", "search");
        Ok((page_hits, total))
    }

    async fn update(
        &self,
        patient_id: &str,
        updates: serde_json::Value,
        role: Role,
    ) -> PaResult<FilteredPatientRecord> {
        if !role.can("write") {
            return Err(PaError::Forbidden {
                role: format!("{role:?}"),
                operation: "write".to_string(),
            });
        }

        let serde_json::Value::Object(map) = &updates else {
            return Err(PaError::Validation {
                missing: vec!["updates must be a JSON object".to_string()],
            });
        };

        let mut disallowed = Vec::new();
        for key in map.keys() {
            if !PatientRecord::MUTABLE_FIELDS.contains(&key.as_str()) {
                disallowed.push(key.clone());
            }
        }
        if !disallowed.is_empty() {
            return Err(PaError::Validation { missing: disallowed });
        }

        if let Some(age) = map.get("age") {
            let ok = age.as_u64().map(|a| a <= 150).unwrap_or(false);
            if !ok {
                return Err(PaError::Validation {
                    missing: vec!["age must be in [0, 150]".to_string()],
                });
            }
        }
        if let Some(gender) = map.get("gender") {
            let ok = gender
                .as_str()
                .map(|g| matches!(g, "M" | "F" | "O" | "U"))
                .unwrap_or(false);
            if !ok {
                return Err(PaError::Validation {
                    missing: vec!["gender must be one of M, F, O, U".to_string()],
                });
            }
        }

        let mut state = self.state.lock().expect("patient service lock poisoned");
        let record = state.records.get(patient_id).cloned().or_else(|| mock_data::patient_record(patient_id));
        let mut record = record.ok_or_else(|| PaError::NotFound {
            entity: "patient".to_string(),
            id: patient_id.to_string(),
        })?;

        apply_updates(&mut record, map);
        record.last_updated = Utc::now();
        state.records.insert(patient_id.to_string(), record.clone());
        drop(state);

        self.record_audit(patient_id, "update");
        Ok(Self::filter_for_role(&record, role))
    }

    async fn consent(&self, patient_id: &str, action: &str) -> PaResult<bool> {
        let mut state = self.state.lock().expect("patient service lock poisoned");
        if action == "revoke" {
            state.consent.insert(patient_id.to_string(), false);
        } else {
            state.consent.entry(patient_id.to_string()).or_insert(true);
        }
        Ok(*state.consent.get(patient_id).unwrap_or(&true))
    }
}

fn apply_updates(record: &mut PatientRecord, map: &serde_json::Map<String, serde_json::Value>) {
    if let Some(v) = map.get("diagnoses_icd10").and_then(|v| v.as_array()) {
        record.diagnoses_icd10 = v.iter().filter_map(|x| x.as_str().map(String::from)).collect();
    }
    if let Some(v) = map.get("medication_history").and_then(|v| v.as_array()) {
        record.medication_history = v.iter().filter_map(|x| x.as_str().map(String::from)).collect();
    }
    if let Some(v) = map.get("notes").and_then(|v| v.as_array()) {
        record.notes = v.iter().filter_map(|x| x.as_str().map(String::from)).collect();
    }
    if let Some(v) = map.get("labs").and_then(|v| v.as_object()) {
        for (k, val) in v {
            if let Some(s) = val.as_str() {
                record.labs.insert(k.clone(), s.to_string());
            }
        }
    }
    if let Some(v) = map.get("age").and_then(|v| v.as_u64()) {
        record.age = v as u8;
    }
    if let Some(v) = map.get("gender").and_then(|v| v.as_str()) {
        record.gender = v.to_string();
    }
    if let Some(v) = map.get("provider_type").and_then(|v| v.as_str()) {
        record.provider_type = v.to_string();
    }
}

/// ICD-10 validation regex (§4.2.2).
pub fn is_valid_icd10(code: &str) -> bool {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| {
        regex::Regex::new(r"^[A-TV-Z][0-9][0-9A-Z](\.[0-9A-TV-Z]{1,4})?$").expect("valid regex")
    });
    re.is_match(code)
}

/// Case-insensitive search match scoring in `[0, 1]` (§4.2.2).
fn score_match(record: &PatientRecord, criteria: &SearchCriteria) -> Option<f64> {
    let mut checks = 0u32;
    let mut hits = 0u32;

    if let Some((min, max)) = criteria.age_range {
        checks += 1;
        if record.age >= min && record.age <= max {
            hits += 1;
        } else {
            return None;
        }
    }
    if let Some(exact) = criteria.age_exact {
        checks += 1;
        if record.age == exact {
            hits += 1;
        } else {
            return None;
        }
    }
    if let Some(diagnosis) = &criteria.diagnosis {
        checks += 1;
        if record.has_diagnosis(diagnosis) {
            hits += 1;
        } else {
            return None;
        }
    }
    if let Some(medication) = &criteria.medication {
        checks += 1;
        if record.has_taken(medication) {
            hits += 1;
        } else {
            return None;
        }
    }

    if checks == 0 {
        Some(0.5)
    } else {
        Some(hits as f64 / checks as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_seeded_record_for_physician() {
        let svc = MockPatientService::new();
        let record = svc.get("patient-001", Role::Physician).await.unwrap();
        assert_eq!(record.patient_id, "patient-001");
    }

    #[tokio::test]
    async fn get_anonymizes_id_for_researcher() {
        let svc = MockPatientService::new();
        let record = svc.get("patient-001", Role::Researcher).await.unwrap();
        assert_ne!(record.patient_id, "patient-001");
        assert_eq!(record.patient_id.len(), 8);
    }

    #[tokio::test]
    async fn nurse_cannot_write() {
        let svc = MockPatientService::new();
        let result = svc
            .update("patient-001", serde_json::json!({"age": 60}), Role::Nurse)
            .await;
        assert!(matches!(result, Err(PaError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn update_rejects_disallowed_field() {
        let svc = MockPatientService::new();
        let result = svc
            .update("patient-001", serde_json::json!({"patient_id": "x"}), Role::Physician)
            .await;
        assert!(matches!(result, Err(PaError::Validation { .. })));
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_age() {
        let svc = MockPatientService::new();
        let result = svc
            .update("patient-001", serde_json::json!({"age": 200}), Role::Physician)
            .await;
        assert!(matches!(result, Err(PaError::Validation { .. })));
    }

    #[tokio::test]
    async fn update_mutates_allowed_field() {
        let svc = MockPatientService::new();
        let updated = svc
            .update(
                "patient-001",
                serde_json::json!({"notes": ["follow up in 2 weeks"]}),
                Role::Physician,
            )
            .await
            .unwrap();
        assert_eq!(updated.notes, vec!["follow up in 2 weeks".to_string()]);
    }

    #[test]
    fn icd10_validation() {
        assert!(is_valid_icd10("E11.9"));
        assert!(is_valid_icd10("I10"));
        assert!(!is_valid_icd10("11.9"));
        assert!(!is_valid_icd10("E119999"));
    }
}
