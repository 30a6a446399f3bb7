//! Request/response envelope types for the operation surface the core
//! exposes (§6). The transport that carries these over a wire is external
//! to this crate — these types only need to be `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request for any of the operations named in the canonical task registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Canonical task name, e.g. `"predict_approval_likelihood"`.
    pub task_name: String,
    pub task_id: Option<String>,
    pub workflow_id: Option<String>,
    pub correlation_id: Option<String>,
    pub payload: Value,
}

/// The outcome status of a `TaskRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Completed,
    Partial,
    NotFound,
    Failed,
    Forbidden,
    Retry,
}

/// The response to a `TaskRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub status: TaskStatus,
    pub agent_id: String,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub missing: Option<Vec<String>>,
}

impl TaskResponse {
    pub fn completed(agent_id: impl Into<String>, result: Value) -> Self {
        Self {
            status: TaskStatus::Completed,
            agent_id: agent_id.into(),
            result: Some(result),
            error_message: None,
            missing: None,
        }
    }

    pub fn failed(agent_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            agent_id: agent_id.into(),
            result: None,
            error_message: Some(error_message.into()),
            missing: None,
        }
    }

    pub fn retry(agent_id: impl Into<String>, missing: Vec<String>) -> Self {
        Self {
            status: TaskStatus::Retry,
            agent_id: agent_id.into(),
            result: None,
            error_message: Some("validation failed".to_string()),
            missing: Some(missing),
        }
    }

    pub fn forbidden(agent_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Forbidden,
            agent_id: agent_id.into(),
            result: None,
            error_message: Some(error_message.into()),
            missing: None,
        }
    }

    pub fn not_found(agent_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::NotFound,
            agent_id: agent_id.into(),
            result: None,
            error_message: Some(error_message.into()),
            missing: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_round_trips_through_json() {
        let resp = TaskResponse::completed("pa-orchestrator", serde_json::json!({"ok": true}));
        let encoded = serde_json::to_string(&resp).unwrap();
        let decoded: TaskResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.status, TaskStatus::Completed);
        assert_eq!(decoded.agent_id, "pa-orchestrator");
    }

    #[test]
    fn retry_carries_missing_fields() {
        let resp = TaskResponse::retry("pa-patient", vec!["patient_id".to_string()]);
        assert_eq!(resp.status, TaskStatus::Retry);
        assert_eq!(resp.missing, Some(vec!["patient_id".to_string()]));
    }
}
