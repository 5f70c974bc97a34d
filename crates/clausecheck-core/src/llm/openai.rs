use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::LlmSettings;
use crate::analysis::{AnalysisError, AnalysisResult, Analyzer};

const SYSTEM_PROMPT: &str = "You are a contract-review assistant. Analyze the contract for legal \
risk and respond with strict JSON only, no markdown fences, matching exactly this shape: \
{\"overallRisk\": \"low|medium|high\", \"riskScore\": <integer 0-100>, \
\"plainEnglishSummary\": \"...\", \"legalIssues\": [{\"type\": \"...\", \"description\": \"...\", \
\"risk\": \"low|medium|high\", \"suggestion\": \"...\"}], \"recommendations\": [{\"clause\": \"...\", \
\"currentText\": \"...\", \"suggestedText\": \"...\", \"reasoning\": \"...\"}]}";

/// Analyzer strategy that delegates to a chat-completions endpoint and
/// parses the model's JSON reply into the shared result shape. The model's
/// self-reported score and tier are taken as-is; no cross-validation
/// against the heuristic thresholds happens here.
#[derive(Debug, Clone)]
pub struct ModelAnalyzer {
    http: Client,
    url: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
}

impl ModelAnalyzer {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            bail!("model API key must be provided via CLAUSECHECK_API_KEY");
        }
        let base = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string());
        let url = format!("{}/v1/chat/completions", base.trim_end_matches('/'));
        let http = Client::builder()
            .user_agent("clausecheck/0.1")
            .build()
            .context("failed to build model HTTP client")?;
        Ok(Self {
            http,
            url,
            api_key: settings.api_key.clone(),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            // Waits on the endpoint indefinitely unless a timeout is
            // configured; deadlines belong to the deployment, not here.
            timeout: settings.timeout_secs.map(Duration::from_secs),
        })
    }

    /// Model identifier recorded alongside completed analyses.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Analyzer for ModelAnalyzer {
    #[instrument(
        name = "model_analysis",
        skip(self, contract_text),
        fields(model = %self.model, text_len = contract_text.len())
    )]
    async fn analyze(
        &self,
        contract_text: &str,
        industry_type: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Industry: {industry_type}\n\nContract text:\n{contract_text}"
                    ),
                },
            ],
            temperature: 0.2,
            max_tokens: 1500,
        };

        // Timeouts and transport failures count as upstream failures; retry
        // policy, if any, belongs to the caller.
        let mut request = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|err| AnalysisError::Upstream(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream(format!(
                "completion endpoint returned {status}: {body}"
            )));
        }

        let chat: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| AnalysisError::Parse(format!("invalid completion envelope: {err}")))?;
        let content = chat
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| {
                AnalysisError::Parse("completion response missing message content".to_string())
            })?;

        let result: AnalysisResult = serde_json::from_str(&content).map_err(|err| {
            AnalysisError::Parse(format!("completion text is not the demanded JSON: {err}"))
        })?;
        debug!(
            risk_score = result.risk_score,
            issues = result.issues.len(),
            "model analysis completed"
        );
        Ok(result)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
