use anyhow::{bail, Context, Result};

use crate::llm_client::LlmConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.4;
const DEFAULT_BATCH_MAX_ROWS: usize = 10;

/// Hard ceiling for the per-batch row cap. Bounds external-call volume.
pub const BATCH_MAX_ROWS_LIMIT: usize = 50;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub temperature: f32,
    pub batch_max_rows: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let batch_max_rows = optional_env("BATCH_MAX_ROWS", DEFAULT_BATCH_MAX_ROWS)?;
        if !(1..=BATCH_MAX_ROWS_LIMIT).contains(&batch_max_rows) {
            bail!("BATCH_MAX_ROWS must be between 1 and {BATCH_MAX_ROWS_LIMIT}, got {batch_max_rows}");
        }

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: optional_env("LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            batch_max_rows,
            port: optional_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Credentials and model parameters for the completion client.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
            temperature: self.temperature,
        }
    }

    /// Resolves a caller-supplied row cap against the configured default and the hard limit.
    pub fn resolve_max_rows(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.batch_max_rows)
            .clamp(1, BATCH_MAX_ROWS_LIMIT)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        openai_api_key: "test-key".to_string(),
        openai_base_url: DEFAULT_BASE_URL.to_string(),
        openai_model: DEFAULT_MODEL.to_string(),
        temperature: DEFAULT_TEMPERATURE,
        batch_max_rows: DEFAULT_BATCH_MAX_ROWS,
        port: 8080,
        rust_log: "info".to_string(),
    }
}
