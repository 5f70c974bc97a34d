use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Identity of the calling principal, resolved from a bearer credential.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid bearer token")]
    InvalidToken,
}

/// Port for the external identity collaborator. The analysis core never
/// sees credentials; verification happens before analysis runs.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Verifier backed by a fixed token → user mapping, configured at startup.
/// Stands in for a managed identity provider.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    /// Parse a `token=user,token2=user2` spec, as carried by
    /// `CLAUSECHECK_API_TOKENS`.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut verifier = Self::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (token, user_id) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("invalid token spec entry `{pair}` (expected token=user)"))?;
            verifier.tokens.insert(token.trim().to_string(), user_id.trim().to_string());
        }
        Ok(verifier)
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .map(|user_id| Principal {
                user_id: user_id.clone(),
            })
            .ok_or(AuthError::InvalidToken)
    }
}
