//! Anthropic Messages API client.

use super::{LanguageModel, MessageRequest, MessageResponse};
use crate::config::LlmSettings;
use crate::error::{CoursemateError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// HTTP client for `POST /v1/messages`.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    api_version: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AnthropicClient {
    /// Create a client with an explicit key.
    pub fn new(api_key: impl Into<String>, settings: &LlmSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CoursemateError::Config("API key must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CoursemateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_version: settings.api_version.clone(),
        })
    }

    /// Create a client reading the key from the configured environment variable.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            CoursemateError::Config(format!(
                "{} environment variable not set",
                settings.api_key_env
            ))
        })?;
        Self::new(api_key, settings)
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse> {
        debug!(
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Sending message request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(%status, "Messages API error");
            return Err(CoursemateError::LlmApi {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| CoursemateError::Llm(format!("Failed to parse response: {}", e)))?;

        debug!(
            stop_reason = ?parsed.stop_reason,
            output_tokens = parsed.usage.output_tokens,
            "Received model response"
        );
        Ok(parsed)
    }
}
