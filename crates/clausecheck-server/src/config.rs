use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;

/// Which analyzer strategy this deployment runs. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerStrategy {
    Heuristic,
    Model,
}

impl FromStr for AnalyzerStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "rule-based" => Ok(Self::Heuristic),
            "model" | "llm" => Ok(Self::Model),
            other => Err(anyhow::anyhow!(
                "unknown analyzer strategy `{other}` (expected heuristic or model)"
            )),
        }
    }
}

/// Environment-driven server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub strategy: AnalyzerStrategy,
    pub lexicon_dir: Option<PathBuf>,
    pub api_tokens: String,
}

impl ServerConfig {
    const BIND_ENV: &'static str = "CLAUSECHECK_BIND";
    const STRATEGY_ENV: &'static str = "CLAUSECHECK_STRATEGY";
    const LEXICON_DIR_ENV: &'static str = "CLAUSECHECK_LEXICON_DIR";
    const API_TOKENS_ENV: &'static str = "CLAUSECHECK_API_TOKENS";

    /// Load configuration from environment variables.
    ///
    /// * `CLAUSECHECK_BIND`        — listen address (default `127.0.0.1:8787`).
    /// * `CLAUSECHECK_STRATEGY`    — `heuristic` (default) or `model`.
    /// * `CLAUSECHECK_LEXICON_DIR` — directory holding `terms.txt`; builtin
    ///   lexicon when unset.
    /// * `CLAUSECHECK_API_TOKENS`  — `token=user` pairs, comma separated.
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let bind_addr = vars
            .get(Self::BIND_ENV)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "127.0.0.1:8787".to_string());
        let strategy = vars
            .get(Self::STRATEGY_ENV)
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(AnalyzerStrategy::Heuristic);
        let lexicon_dir = vars
            .get(Self::LEXICON_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let api_tokens = vars.get(Self::API_TOKENS_ENV).cloned().unwrap_or_default();

        Ok(Self {
            bind_addr,
            strategy,
            lexicon_dir,
            api_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_to_heuristic_strategy() {
        let config = ServerConfig::from_map(vars(&[])).unwrap();
        assert_eq!(config.strategy, AnalyzerStrategy::Heuristic);
        assert_eq!(config.bind_addr, "127.0.0.1:8787");
        assert!(config.lexicon_dir.is_none());
        assert!(config.api_tokens.is_empty());
    }

    #[test]
    fn parses_model_strategy_aliases() {
        for alias in ["model", "LLM"] {
            let config =
                ServerConfig::from_map(vars(&[("CLAUSECHECK_STRATEGY", alias)])).unwrap();
            assert_eq!(config.strategy, AnalyzerStrategy::Model);
        }
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = ServerConfig::from_map(vars(&[("CLAUSECHECK_STRATEGY", "oracle")]))
            .expect_err("unknown strategy should error");
        assert!(err.to_string().contains("unknown analyzer strategy"));
    }

    #[test]
    fn reads_lexicon_dir_and_tokens() {
        let config = ServerConfig::from_map(vars(&[
            ("CLAUSECHECK_LEXICON_DIR", "./lexicon"),
            ("CLAUSECHECK_API_TOKENS", "abc=user-1"),
        ]))
        .unwrap();
        assert_eq!(config.lexicon_dir, Some(PathBuf::from("./lexicon")));
        assert_eq!(config.api_tokens, "abc=user-1");
    }
}
