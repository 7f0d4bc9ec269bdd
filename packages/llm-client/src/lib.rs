//! OpenAI-compatible structured output client
//!
//! A small client for chat-completions endpoints that support the
//! `json_schema` response format (OpenAI, Gemini's OpenAI compatibility
//! layer, Ollama). It has no knowledge of what is being extracted.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{LlmClient, StructuredOutput, StructuredRequest};
//!
//! let client = LlmClient::new("gemini/gemini-2.0-flash".parse()?, Some(api_key))?;
//!
//! #[derive(serde::Deserialize, schemars::JsonSchema)]
//! struct Company {
//!     name: String,
//! }
//!
//! let request = StructuredRequest::new(
//!     client.model(),
//!     "Extract the company",
//!     page_markdown,
//!     Company::type_name(),
//!     Company::strict_schema(),
//! );
//! let response = client.structured_output(request).await?;
//! ```

pub mod error;
pub mod provider;
pub mod schema;
pub mod types;

pub use error::{LlmClientError, Result};
pub use provider::{Provider, ProviderKind};
pub use schema::StructuredOutput;
pub use types::*;

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: Option<String>,
    provider: Provider,
}

impl LlmClient {
    /// Create a client for a resolved provider.
    pub fn new(provider: Provider, api_key: Option<String>) -> Result<Self> {
        if provider.kind.requires_api_key() && api_key.as_deref().map_or(true, str::is_empty) {
            return Err(LlmClientError::Config(format!(
                "provider {} requires an API key",
                provider
            )));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| LlmClientError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            provider,
        })
    }

    /// Set a custom base URL (proxies, self-hosted gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.provider = self.provider.with_base_url(url);
        self
    }

    /// The resolved provider.
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Model name sent with each request.
    pub fn model(&self) -> &str {
        &self.provider.model
    }

    /// Structured output with JSON schema.
    ///
    /// Returns the raw JSON text the model produced; callers decide how to
    /// validate it.
    pub async fn structured_output(&self, request: StructuredRequest) -> Result<StructuredResponse> {
        let start = std::time::Instant::now();

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .header("Content-Type", "application/json")
            .json(&request);

        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, provider = %self.provider, "LLM request failed");
            LlmClientError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);
            warn!(status = %status, error = %message, provider = %self.provider, "LLM API error");
            return Err(LlmClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmClientError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmClientError::EmptyResponse)?;

        debug!(
            provider = %self.provider,
            schema = %request.response_format.json_schema.name,
            duration_ms = start.elapsed().as_millis(),
            response_len = content.len(),
            "Structured output completed"
        );

        Ok(StructuredResponse {
            content,
            usage: chat_response.usage,
        })
    }
}
