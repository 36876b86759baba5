// Shared prompt fragments used by every caller of the completion client.
// Each feature module keeps its own prompt templates alongside it.

/// System instruction that enforces JSON-only structured output.
pub const JSON_ANALYST_SYSTEM: &str =
    "You return structured business analysis as valid JSON only.";

/// Opening line of every JSON-returning user prompt.
pub const RAW_JSON_PREAMBLE: &str =
    "Return ONLY raw JSON. Do not wrap in ```json. Do not include any extra text.";
