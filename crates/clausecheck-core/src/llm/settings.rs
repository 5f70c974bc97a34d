use anyhow::{Context, Result};
use std::collections::HashMap;

/// Environment-driven configuration for the model-backed analyzer. Passed
/// explicitly into the client constructor; nothing reads the key globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl LlmSettings {
    const API_KEY_ENV: &'static str = "CLAUSECHECK_API_KEY";
    const ENDPOINT_ENV: &'static str = "CLAUSECHECK_ENDPOINT";
    const MODEL_ENV: &'static str = "CLAUSECHECK_MODEL";
    const TIMEOUT_ENV: &'static str = "CLAUSECHECK_TIMEOUT_SECS";

    /// Load settings from environment variables.
    ///
    /// * `CLAUSECHECK_API_KEY`      — API key/token (required).
    /// * `CLAUSECHECK_ENDPOINT`     — Optional custom base URL.
    /// * `CLAUSECHECK_MODEL`        — Optional model override.
    /// * `CLAUSECHECK_TIMEOUT_SECS` — Optional request timeout.
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let api_key = vars
            .get(Self::API_KEY_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| {
                format!(
                    "environment variable {} must be set for the model-backed analyzer",
                    Self::API_KEY_ENV
                )
            })?;
        let endpoint = vars
            .get(Self::ENDPOINT_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty());
        let model = vars
            .get(Self::MODEL_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty());
        let timeout_secs = vars
            .get(Self::TIMEOUT_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok());

        Ok(Self {
            api_key,
            endpoint,
            model,
            timeout_secs,
        })
    }
}
