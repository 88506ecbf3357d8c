//! Google Gemini `generateContent` client

use super::{Formatter, FormatterError};
use crate::config::FormatterConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct GeminiFormatter {
    model: String,
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiFormatter {
    pub fn new(config: &FormatterConfig) -> Result<Self, FormatterError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FormatterError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FormatterError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn send(&self, prompt: &str) -> Result<String, FormatterError> {
        let body = GenerateRequest::new(prompt);

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FormatterError::Network("Request timed out".to_string())
                } else {
                    FormatterError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            let message = error_message(&response.text().await.unwrap_or_default())
                .unwrap_or_else(|| "Invalid API key or insufficient permissions".to_string());
            return Err(FormatterError::AuthenticationFailed(message));
        }

        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Gemini returned error");
            return Err(FormatterError::Api {
                status,
                message: error_message(&body).unwrap_or(body),
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| FormatterError::Api {
            status,
            message: format!("Failed to parse response: {e}"),
        })?;

        parsed.text().ok_or(FormatterError::EmptyResponse)
    }
}

#[async_trait]
impl Formatter for GeminiFormatter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn format(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, FormatterError> {
        if cancel.is_cancelled() {
            return Err(FormatterError::Cancelled);
        }

        tokio::select! {
            result = self.send(prompt) => result,
            _ = cancel.cancelled() => Err(FormatterError::Cancelled),
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![PartOut { text: prompt }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<PartOut<'a>>,
}

#[derive(Debug, Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Debug, Deserialize)]
struct PartIn {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}
