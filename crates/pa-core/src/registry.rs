//! Explicit task-name registry, replacing reflective dynamic dispatch (§9).
//!
//! Canonical task names (§6) are mapped to handler closures at startup.
//! An unknown task name returns `TaskResponse::failed` listing the
//! supported names, rather than attempting any kind of fuzzy lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use pa_contracts::envelope::{TaskRequest, TaskResponse};

pub type TaskHandler = Arc<dyn Fn(TaskRequest) -> BoxFuture<'static, TaskResponse> + Send + Sync>;

/// Rewrites an incoming task name onto its canonical registered form before
/// lookup (e.g. folding literal synonyms and dynamically-named task
/// variants). Injected by the caller building the registry so that
/// `pa-core` itself stays free of any domain-specific naming rules.
pub type TaskNameNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone, Default)]
pub struct TaskRegistry {
    handlers: BTreeMap<String, TaskHandler>,
    normalizer: Option<TaskNameNormalizer>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task_name: impl Into<String>, handler: TaskHandler) {
        self.handlers.insert(task_name.into(), handler);
    }

    /// Install a task-name normalizer; `dispatch` applies it to
    /// `request.task_name` before looking up a handler.
    pub fn set_normalizer(&mut self, normalizer: TaskNameNormalizer) {
        self.normalizer = Some(normalizer);
    }

    pub fn supported_tasks(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub async fn dispatch(&self, mut request: TaskRequest) -> TaskResponse {
        if let Some(normalize) = &self.normalizer {
            request.task_name = normalize(&request.task_name);
        }

        match self.handlers.get(&request.task_name) {
            Some(handler) => handler(request).await,
            None => TaskResponse::failed(
                "task-registry",
                format!(
                    "unknown task '{}'; supported tasks: {:?}",
                    request.task_name,
                    self.supported_tasks()
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_contracts::envelope::TaskStatus;

    fn make_request(task_name: &str) -> TaskRequest {
        TaskRequest {
            task_name: task_name.to_string(),
            task_id: None,
            workflow_id: None,
            correlation_id: None,
            payload: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn unknown_task_name_fails_with_supported_list() {
        let registry = TaskRegistry::new();
        let resp = registry.dispatch(make_request("nonexistent_task")).await;
        assert_eq!(resp.status, TaskStatus::Failed);
        assert!(resp.error_message.unwrap().contains("unknown task"));
    }

    #[tokio::test]
    async fn registered_task_dispatches_to_its_handler() {
        let mut registry = TaskRegistry::new();
        registry.register(
            "echo",
            Arc::new(|req: TaskRequest| {
                Box::pin(async move { TaskResponse::completed("echo", req.payload) })
            }),
        );
        let resp = registry
            .dispatch(make_request("echo"))
            .await;
        assert_eq!(resp.status, TaskStatus::Completed);
    }
}
