//! Response schema for model output.
//!
//! The model is asked for a flat JSON object; this module turns its raw text into a
//! typed value or a structured error. Missing keys are a hard failure, never default-filled.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::insight::invoker::CompletionError;
use crate::insight::models::InsightResult;
use crate::llm_client::strip_json_fences;

/// Keys every insight response must carry, in canonical order.
pub const REQUIRED_KEYS: [&str; 4] = [
    "category",
    "opportunity_summary",
    "email_subject",
    "email_body",
];

/// An explicit description of the object the model must return.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSchema {
    pub required: &'static [&'static str],
}

/// Schema for `InsightResult`.
pub const INSIGHT_SCHEMA: ResponseSchema = ResponseSchema {
    required: &REQUIRED_KEYS,
};

impl ResponseSchema {
    /// Required keys absent from `object`, in schema order.
    pub fn missing_keys(&self, object: &Map<String, Value>) -> Vec<String> {
        self.required
            .iter()
            .filter(|key| !object.contains_key(**key))
            .map(|key| key.to_string())
            .collect()
    }

    /// Normalizes fenced output, parses it, checks required keys, then deserializes.
    pub fn validate<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CompletionError> {
        let normalized = strip_json_fences(raw);

        let value: Value =
            serde_json::from_str(normalized).map_err(|e| CompletionError::MalformedResponse {
                reason: e.to_string(),
                raw: normalized.to_string(),
            })?;

        // Valid JSON that is not an object carries none of the required keys.
        let missing = match value.as_object() {
            Some(object) => self.missing_keys(object),
            None => self.required.iter().map(|key| key.to_string()).collect(),
        };
        if !missing.is_empty() {
            return Err(CompletionError::IncompleteResponse {
                missing,
                raw: normalized.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| CompletionError::MalformedResponse {
            reason: e.to_string(),
            raw: normalized.to_string(),
        })
    }
}

/// Parses raw model text into a validated `InsightResult`.
pub fn parse_insight(raw: &str) -> Result<InsightResult, CompletionError> {
    INSIGHT_SCHEMA.validate(raw)
}

impl InsightResult {
    /// Compact JSON with keys in schema order. Non-ASCII text is kept as-is.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
