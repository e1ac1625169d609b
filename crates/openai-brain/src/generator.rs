//! OpenAiGenerator implementation using the chat-completions API.

use agent_core::{
    async_trait, hash_prompt, parse_structured, AgentError, GenerationRequest, Parsed,
    TextGenerator,
};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
};
use crate::config::OpenAiConfig;

/// A text generator backed by an OpenAI-compatible chat-completions API.
///
/// Stateless: each call sends one system and one user message.
pub struct OpenAiGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!("OpenAiGenerator initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Create a generator from environment variables.
    ///
    /// See [`OpenAiConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    async fn chat_completion(
        &self,
        request: &GenerationRequest,
        response_format: Option<ResponseFormat>,
    ) -> Result<String, AgentError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url.trim_end_matches('/'));
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.config.model);

        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(request.user_prompt.clone()),
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            response_format,
        };

        debug!(
            "Requesting completion: model={}, system_prompt={}",
            body.model,
            hash_prompt(&request.system_prompt)
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(self.config.timeout)
                } else {
                    AgentError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(AgentError::GenerationFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(AgentError::GenerationFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AgentError::GenerationFailed(format!("Failed to parse response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AgentError::GenerationFailed("empty completion".to_string()));
        }

        Ok(content)
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AgentError> {
        self.chat_completion(&request, None).await
    }

    async fn generate_structured(
        &self,
        request: GenerationRequest,
    ) -> Result<Parsed<Value>, AgentError> {
        let text = self
            .chat_completion(&request, Some(ResponseFormat::json_object()))
            .await?;
        Ok(parse_structured(&text))
    }

    fn name(&self) -> &str {
        "OpenAiGenerator"
    }
}
