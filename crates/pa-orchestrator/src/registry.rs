//! Wires the canonical task names (§6) to the orchestrator and specialist
//! services via an explicit `TaskRegistry`, replacing reflective dispatch.

use std::sync::Arc;

use serde_json::json;

use pa_contracts::envelope::{TaskRequest, TaskResponse};
use pa_contracts::patient::{Role, SearchCriteria};
use pa_core::registry::TaskRegistry;

use crate::orchestrator::PaOrchestrator;

fn payload_str(request: &TaskRequest, field: &str) -> Option<String> {
    request.payload.get(field).and_then(|v| v.as_str()).map(str::to_string)
}

fn missing_fields_response(agent_id: &str, missing: Vec<&str>) -> TaskResponse {
    TaskResponse::retry(agent_id, missing.into_iter().map(str::to_string).collect())
}

/// Build a `TaskRegistry` with handlers for every operation named in §6's
/// table. Unknown task names fall through to `TaskRegistry::dispatch`'s
/// own "unknown task" response.
pub fn build_registry(orchestrator: Arc<PaOrchestrator>) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.set_normalizer(Arc::new(pa_specialists::normalize::normalize_task_name));

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "predict_approval_likelihood",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let (patient_id, drug_name, insurer_id) = match (
                        payload_str(&request, "patient_id"),
                        payload_str(&request, "drug_name"),
                        payload_str(&request, "insurer_id"),
                    ) {
                        (Some(p), Some(d), Some(i)) => (p, d, i),
                        _ => return missing_fields_response("pa-orchestrator", vec!["patient_id", "drug_name", "insurer_id"]),
                    };
                    let urgency = payload_str(&request, "urgency");

                    match orchestrator.predict_approval_likelihood(&patient_id, &drug_name, &insurer_id, urgency).await {
                        Ok(prediction) => TaskResponse::completed("pa-orchestrator", json!({ "prediction": prediction })),
                        Err(err) if err.is_fatal() => TaskResponse::failed("pa-orchestrator", err.to_string()),
                        Err(err) => TaskResponse::failed("pa-orchestrator", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "get_patient_record",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let Some(patient_id) = payload_str(&request, "patient_id") else {
                        return missing_fields_response("pa-patient", vec!["patient_id"]);
                    };
                    let role = request
                        .payload
                        .get("role")
                        .and_then(|v| serde_json::from_value::<Role>(v.clone()).ok())
                        .unwrap_or(Role::Physician);

                    match orchestrator.patient_service().get(&patient_id, role).await {
                        Ok(record) => TaskResponse::completed("pa-patient", json!({ "record": record })),
                        Err(err) => TaskResponse::not_found("pa-patient", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "search_patients",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let criteria: SearchCriteria = request
                        .payload
                        .get("criteria")
                        .and_then(|v| serde_json::from_value(v.clone()).ok())
                        .unwrap_or_default();
                    let page = request.payload.get("page").and_then(|v| v.as_u64()).unwrap_or(1) as u32;
                    let page_size = request.payload.get("page_size").and_then(|v| v.as_u64()).unwrap_or(20) as u32;

                    match orchestrator
                        .patient_service()
                        .search(criteria, page, page_size, Role::Physician)
                        .await
                    {
                        Ok((results, total_pages)) => {
                            TaskResponse::completed("pa-patient", json!({ "results": results, "total_pages": total_pages }))
                        }
                        Err(err) => TaskResponse::failed("pa-patient", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "get_policy_for_drug",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let Some(drug_name) = payload_str(&request, "drug_name") else {
                        return missing_fields_response("pa-policy", vec!["drug_name"]);
                    };
                    let insurer = payload_str(&request, "insurer").unwrap_or_else(|| "uhc".to_string());

                    match orchestrator.policy_service().get_policy(&drug_name, &insurer).await {
                        Ok(policy) => TaskResponse::completed("pa-policy", json!({ "policy": policy })),
                        Err(err) => TaskResponse::not_found("pa-policy", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "check_coverage_criteria",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let Some(drug_name) = payload_str(&request, "drug_name") else {
                        return missing_fields_response("pa-policy", vec!["drug_name"]);
                    };
                    let insurer = payload_str(&request, "insurer").unwrap_or_else(|| "uhc".to_string());
                    let patient_evidence = match request.payload.get("patient_evidence") {
                        Some(v) => match serde_json::from_value(v.clone()) {
                            Ok(p) => p,
                            Err(_) => return missing_fields_response("pa-policy", vec!["patient_evidence"]),
                        },
                        None => return missing_fields_response("pa-policy", vec!["patient_evidence"]),
                    };

                    match orchestrator.policy_service().check_coverage(&drug_name, &insurer, &patient_evidence).await {
                        Ok(decision) => TaskResponse::completed("pa-policy", json!({ "coverage_decision": decision })),
                        Err(err) => TaskResponse::failed("pa-policy", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "get_drug_info",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let Some(drug_name) = payload_str(&request, "drug_name") else {
                        return missing_fields_response("pa-drug", vec!["drug_name"]);
                    };

                    match orchestrator.drug_service().info(&drug_name).await {
                        Ok(info) => TaskResponse::completed("pa-drug", json!({ "drug_info": info })),
                        Err(err) => TaskResponse::not_found("pa-drug", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "check_drug_interactions",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let drug_names: Vec<String> = request
                        .payload
                        .get("drug_names")
                        .and_then(|v| serde_json::from_value(v.clone()).ok())
                        .unwrap_or_default();
                    if drug_names.len() < 2 {
                        return missing_fields_response("pa-drug", vec!["drug_names"]);
                    }

                    match orchestrator.drug_service().interactions(&drug_names).await {
                        Ok((interactions, severity_summary)) => TaskResponse::completed(
                            "pa-drug",
                            json!({ "interactions": interactions, "severity_summary": severity_summary }),
                        ),
                        Err(err) => TaskResponse::failed("pa-drug", err.to_string()),
                    }
                })
            }),
        );
    }

    {
        let orchestrator = Arc::clone(&orchestrator);
        registry.register(
            "get_pa_criteria",
            Arc::new(move |request: TaskRequest| {
                let orchestrator = Arc::clone(&orchestrator);
                Box::pin(async move {
                    let Some(drug_name) = payload_str(&request, "drug_name") else {
                        return missing_fields_response("pa-policy", vec!["drug_name"]);
                    };
                    let insurer = payload_str(&request, "insurer").unwrap_or_else(|| "uhc".to_string());

                    match orchestrator.policy_service().get_policy(&drug_name, &insurer).await {
                        Ok(policy) => TaskResponse::completed("pa-policy", json!({ "pa_criteria": policy.criteria })),
                        Err(err) => TaskResponse::not_found("pa-policy", err.to_string()),
                    }
                })
            }),
        );
    }

    registry
}
