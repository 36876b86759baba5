//! Completion invoker: one prompt, one completion call, one validated insight.

use thiserror::Error;
use tracing::debug;

use crate::insight::models::{InsightResult, ProspectRecord, SenderProfile};
use crate::insight::prompts::build_insight_prompt;
use crate::insight::schema::parse_insight;
use crate::llm_client::prompts::JSON_ANALYST_SYSTEM;
use crate::llm_client::{CompletionBackend, LlmError};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Model response is not valid JSON: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("Model response missing keys: {missing:?}")]
    IncompleteResponse { missing: Vec<String>, raw: String },

    #[error("Completion call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not serialize insight: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Issues exactly one completion call for `prospect` and validates the response.
/// No retry: a failure is returned to the caller as-is.
pub async fn generate_insight(
    llm: &dyn CompletionBackend,
    sender: &SenderProfile,
    prospect: &ProspectRecord,
) -> Result<InsightResult, CompletionError> {
    let prompt = build_insight_prompt(sender, prospect);
    debug!(
        "Requesting insight for '{}' (model: {})",
        prospect.company_name,
        llm.model()
    );

    let raw = llm.complete(JSON_ANALYST_SYSTEM, &prompt).await?;
    parse_insight(&raw)
}

/// The integration point for UI and CLI callers: returns the canonical JSON string
/// with keys `category`, `opportunity_summary`, `email_subject`, `email_body`.
pub async fn ask_insight(
    llm: &dyn CompletionBackend,
    company_name: &str,
    industry: &str,
    notes: &str,
    sender: &SenderProfile,
) -> Result<String, CompletionError> {
    let prospect = ProspectRecord {
        company_name: company_name.to_string(),
        industry: industry.to_string(),
        notes: notes.to_string(),
    };
    let insight = generate_insight(llm, sender, &prospect).await?;
    Ok(insight.to_canonical_json()?)
}
