//! Gemini Provider - Implementation of AIProvider for Google's Gemini API.
//!
//! Calls `models/{model}:generateContent`. A response schema on the request
//! is sent as `generationConfig.responseSchema` with
//! `responseMimeType: application/json`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key).with_model("gemini-2.0-flash");
//! let provider = GeminiProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::transport;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.0-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = transport::http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Converts our request to Gemini's format.
    ///
    /// System messages join the system prompt; assistant turns use the
    /// `model` role.
    fn to_gemini_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let mut system_parts: Vec<Part> = request
            .system_prompt
            .iter()
            .map(|text| Part { text: text.clone() })
            .collect();
        let mut contents = Vec::new();

        for msg in &request.messages {
            let part = Part {
                text: msg.content.clone(),
            };
            match msg.role {
                MessageRole::System => system_parts.push(part),
                MessageRole::User => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![part],
                }),
                MessageRole::Assistant => contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![part],
                }),
            }
        }

        let structured = request.response_schema.is_some();
        GeminiRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| Content {
                role: None,
                parts: system_parts,
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: structured.then(|| "application/json".to_string()),
                response_schema: request.response_schema.as_ref().map(gemini_schema),
            },
        }
    }

    /// Parses a successful response body.
    fn parse_body(&self, body: GeminiResponse) -> Result<CompletionResponse, AIError> {
        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AIError::content_filtered(format!("prompt blocked: {}", reason)));
        }

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("Invalid response structure: no candidates"))?;

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };
        if finish_reason == FinishReason::ContentFilter {
            return Err(AIError::content_filtered("candidate was blocked for safety"));
        }

        let content = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AIError::parse("Invalid response structure: candidate has no text"))?;

        let usage = body
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage,
            model: body.model_version.unwrap_or_else(|| self.config.model.clone()),
            finish_reason,
        })
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let gemini_request = self.to_gemini_request(&request);
        debug!(
            model = %self.config.model,
            trace_id = %request.metadata.trace_id,
            "sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| transport::send_error(e, self.config.timeout))?;
        let response = transport::check_status(response).await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        self.parse_body(body)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

/// Rewrites JSON-schema `type` names to the upper-case form Gemini uses.
fn gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(name)) => Value::String(name.to_uppercase()),
                        // Property names are data, not schema keywords.
                        ("properties", Value::Object(props)) => Value::Object(
                            props
                                .iter()
                                .map(|(name, prop)| (name.clone(), gemini_schema(prop)))
                                .collect(),
                        ),
                        _ => gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(gemini_schema).collect()),
        other => other.clone(),
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
