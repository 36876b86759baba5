// Prospect insight engine.
// Implements: prompt building, the completion invoker, response schema validation,
// CSV batch ingestion, and result export.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod batch;
pub mod export;
pub mod handlers;
pub mod invoker;
pub mod models;
pub mod prompts;
pub mod schema;
