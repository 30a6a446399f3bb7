//! Schema-based verifier for synthesizer output (§4.4 "Output validation").
//!
//! Verification runs in two phases:
//!
//! 1. **Structural** — the decision payload is validated against
//!    `OutputSchema::json_schema` using the `jsonschema` crate.
//! 2. **Semantic** — each `VerificationRule` in `OutputSchema::rules` is
//!    evaluated in order. All failures are collected before returning so
//!    callers see the full failure set in one pass.
//!
//! Custom rules delegate to named functions registered via `register_rule`.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use pa_contracts::verify::{
    OutputSchema, VerificationFailure, VerificationReport, VerificationRuleType,
};

/// A caller-supplied verification function. Returns `Some(message)` on
/// failure, `None` on success.
pub type CustomVerifierFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

pub struct SchemaVerifier {
    custom_rules: HashMap<String, CustomVerifierFn>,
}

impl SchemaVerifier {
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// Register a custom verification function under `name`, matching the
    /// `function_name` used in `VerificationRuleType::Custom` rules.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomVerifierFn) {
        self.custom_rules.insert(name.into(), f);
    }

    fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
        let mut current = value;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(v) if !v.is_null() => current = v,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Verify `payload` against `schema`.
    pub fn verify(&self, payload: &Value, schema: &OutputSchema) -> VerificationReport {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        if !schema.json_schema.is_null() {
            match jsonschema::validator_for(&schema.json_schema) {
                Ok(validator) => {
                    for error in validator.iter_errors(payload) {
                        let message =
                            format!("JSON Schema violation at {}: {}", error.instance_path, error);
                        warn!(schema_id = %schema.schema_id, %message, "structural validation failure");
                        failures.push(VerificationFailure {
                            rule_id: "json-schema".to_string(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    let message = format!("invalid JSON Schema document: {e}");
                    warn!(schema_id = %schema.schema_id, %message, "schema compilation failure");
                    failures.push(VerificationFailure {
                        rule_id: "json-schema".to_string(),
                        message,
                    });
                }
            }
        }

        for rule in &schema.rules {
            debug!(rule_id = %rule.rule_id, "evaluating verification rule");

            let failure_msg: Option<String> = match &rule.rule_type {
                VerificationRuleType::RequiredField { field_path } => {
                    if Self::resolve_path(payload, field_path).is_none() {
                        Some(format!("required field '{field_path}' is missing or null"))
                    } else {
                        None
                    }
                }

                VerificationRuleType::AllowedValues { field_path, allowed } => {
                    match Self::resolve_path(payload, field_path) {
                        None => Some(format!(
                            "field '{field_path}' is missing; cannot check allowed values"
                        )),
                        Some(actual) => {
                            let matches_case_insensitive = actual
                                .as_str()
                                .map(|s| {
                                    allowed
                                        .iter()
                                        .any(|a| a.as_str().is_some_and(|a| a.eq_ignore_ascii_case(s)))
                                })
                                .unwrap_or(false);
                            if allowed.contains(actual) || matches_case_insensitive {
                                None
                            } else {
                                Some(format!(
                                    "field '{field_path}' has value {actual} which is not in the allowed set"
                                ))
                            }
                        }
                    }
                }

                VerificationRuleType::NumericRange { field_path, min, max } => {
                    match Self::resolve_path(payload, field_path).and_then(|v| v.as_f64()) {
                        None => Some(format!(
                            "field '{field_path}' is missing or not numeric"
                        )),
                        Some(value) => {
                            let above_min = min.map(|m| value >= m).unwrap_or(true);
                            let below_max = max.map(|m| value <= m).unwrap_or(true);
                            if above_min && below_max {
                                None
                            } else {
                                Some(format!(
                                    "field '{field_path}' value {value} is outside allowed range"
                                ))
                            }
                        }
                    }
                }

                VerificationRuleType::ForbiddenPattern { field_path, pattern } => {
                    match Self::resolve_path(payload, field_path) {
                        None => None,
                        Some(v) => v.as_str().and_then(|s| {
                            if s.contains(pattern.as_str()) {
                                Some(format!(
                                    "field '{field_path}' contains forbidden pattern '{pattern}'"
                                ))
                            } else {
                                None
                            }
                        }),
                    }
                }

                VerificationRuleType::Custom { function_name } => {
                    match self.custom_rules.get(function_name.as_str()) {
                        Some(f) => f(payload),
                        None => Some(format!(
                            "no custom rule registered for function name '{function_name}'"
                        )),
                    }
                }
            };

            if let Some(message) = failure_msg {
                warn!(rule_id = %rule.rule_id, %message, "semantic rule failed");
                failures.push(VerificationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(schema_id = %schema.schema_id, passed, failure_count = failures.len(), "verification complete");
        VerificationReport { passed, failures }
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the `OutputSchema` the synthesizer pipeline validates every
/// candidate decision against (§4.4 "Output validation").
pub fn decision_output_schema() -> OutputSchema {
    use pa_contracts::verify::VerificationRule;

    OutputSchema {
        schema_id: "pa-decision-v1".to_string(),
        json_schema: Value::Null,
        rules: vec![
            VerificationRule {
                rule_id: "req-likelihood".to_string(),
                description: "approval_likelihood_percent must be present".to_string(),
                rule_type: VerificationRuleType::RequiredField {
                    field_path: "approval_likelihood_percent".to_string(),
                },
            },
            VerificationRule {
                rule_id: "range-likelihood".to_string(),
                description: "approval_likelihood_percent must be in [0, 100]".to_string(),
                rule_type: VerificationRuleType::NumericRange {
                    field_path: "approval_likelihood_percent".to_string(),
                    min: Some(0.0),
                    max: Some(100.0),
                },
            },
            VerificationRule {
                rule_id: "allowed-decision".to_string(),
                description: "decision_prediction must be Approve, Deny, or Pend for More Info"
                    .to_string(),
                rule_type: VerificationRuleType::AllowedValues {
                    field_path: "decision_prediction".to_string(),
                    allowed: vec![
                        Value::String("Approve".to_string()),
                        Value::String("Deny".to_string()),
                        Value::String("Pend for More Info".to_string()),
                    ],
                },
            },
            VerificationRule {
                rule_id: "range-confidence".to_string(),
                description: "confidence_score must be in [0, 1]".to_string(),
                rule_type: VerificationRuleType::NumericRange {
                    field_path: "confidence_score".to_string(),
                    min: Some(0.0),
                    max: Some(1.0),
                },
            },
            VerificationRule {
                rule_id: "req-rationale".to_string(),
                description: "clinical_rationale must be present and non-empty".to_string(),
                rule_type: VerificationRuleType::RequiredField {
                    field_path: "clinical_rationale".to_string(),
                },
            },
            VerificationRule {
                rule_id: "custom-rationale-non-empty".to_string(),
                description: "clinical_rationale must not be the empty string".to_string(),
                rule_type: VerificationRuleType::Custom {
                    function_name: "rationale_non_empty".to_string(),
                },
            },
        ],
    }
}

/// The `rationale_non_empty` custom rule referenced by `decision_output_schema`.
pub fn rationale_non_empty_rule() -> CustomVerifierFn {
    Box::new(|payload: &Value| {
        let rationale = payload.get("clinical_rationale").and_then(Value::as_str);
        match rationale {
            Some(s) if !s.trim().is_empty() => None,
            _ => Some("clinical_rationale must not be empty".to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verifier_with_rules() -> SchemaVerifier {
        let mut v = SchemaVerifier::new();
        v.register_rule("rationale_non_empty", rationale_non_empty_rule());
        v
    }

    #[test]
    fn valid_decision_passes_all_rules() {
        let verifier = verifier_with_rules();
        let payload = json!({
            "approval_likelihood_percent": 82,
            "decision_prediction": "Approve",
            "confidence_score": 0.81,
            "clinical_rationale": "meets step therapy and diagnosis criteria",
        });
        let report = verifier.verify(&payload, &decision_output_schema());
        assert!(report.passed, "failures: {:?}", report.failures);
    }

    #[test]
    fn out_of_range_likelihood_fails() {
        let verifier = verifier_with_rules();
        let payload = json!({
            "approval_likelihood_percent": 142,
            "decision_prediction": "Approve",
            "confidence_score": 0.81,
            "clinical_rationale": "x",
        });
        let report = verifier.verify(&payload, &decision_output_schema());
        assert!(!report.passed);
        assert!(report.failures.iter().any(|f| f.rule_id == "range-likelihood"));
    }

    #[test]
    fn empty_rationale_fails_custom_rule() {
        let verifier = verifier_with_rules();
        let payload = json!({
            "approval_likelihood_percent": 50,
            "decision_prediction": "Pend for More Info",
            "confidence_score": 0.5,
            "clinical_rationale": "   ",
        });
        let report = verifier.verify(&payload, &decision_output_schema());
        assert!(!report.passed);
        assert!(report
            .failures
            .iter()
            .any(|f| f.rule_id == "custom-rationale-non-empty"));
    }

    #[test]
    fn disallowed_decision_value_fails() {
        let verifier = verifier_with_rules();
        let payload = json!({
            "approval_likelihood_percent": 50,
            "decision_prediction": "Maybe",
            "confidence_score": 0.5,
            "clinical_rationale": "unclear",
        });
        let report = verifier.verify(&payload, &decision_output_schema());
        assert!(!report.passed);
        assert!(report.failures.iter().any(|f| f.rule_id == "allowed-decision"));
    }
}
