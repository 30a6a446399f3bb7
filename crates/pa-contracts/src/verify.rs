//! Output verification schema and report types.
//!
//! Before a synthesizer response is accepted as a decision, it is run
//! against an `OutputSchema`: a JSON Schema document for structural checks
//! plus a list of `VerificationRule`s for business-logic checks JSON Schema
//! cannot express (§4.4 "Output validation").

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    pub schema_id: String,
    pub json_schema: Value,
    pub rules: Vec<VerificationRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    pub rule_id: String,
    pub description: String,
    pub rule_type: VerificationRuleType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationRuleType {
    RequiredField {
        field_path: String,
    },
    AllowedValues {
        field_path: String,
        allowed: Vec<Value>,
    },
    NumericRange {
        field_path: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    ForbiddenPattern {
        field_path: String,
        pattern: String,
    },
    Custom {
        function_name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub passed: bool,
    pub failures: Vec<VerificationFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub rule_id: String,
    pub message: String,
}
