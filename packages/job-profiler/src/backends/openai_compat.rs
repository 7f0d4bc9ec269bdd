//! LLM backend over any OpenAI-compatible chat completions endpoint.
//!
//! Infrastructure only: what to ask for lives in the pipeline prompts and
//! schemas.

use async_trait::async_trait;
use llm_client::{LlmClient, LlmClientError, Sampling, StructuredRequest};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::traits::llm::{DecodeParams, LlmBackend, LlmRequest};

/// Backend wrapping [`LlmClient`].
#[derive(Clone)]
pub struct OpenAiCompatBackend {
    client: LlmClient,
    name: String,
}

impl OpenAiCompatBackend {
    pub fn new(client: LlmClient) -> Self {
        let name = client.provider().to_string();
        Self { client, name }
    }

    /// Build the backend from provider settings.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmClientError> {
        Ok(Self::new(config.build_client()?))
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatBackend {
    async fn extract(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let structured = StructuredRequest::new(
            self.client.model(),
            request.instruction.clone(),
            request.content.clone(),
            request.schema_name.clone(),
            request.schema.clone(),
        )
        .sampling(sampling(request.decode));

        let response = self
            .client
            .structured_output(structured)
            .await
            .map_err(into_llm_error)?;

        if let Some(usage) = &response.usage {
            debug!(
                url = %request.source_url,
                schema = %request.schema_name,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM token usage"
            );
        }

        Ok(response.content)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn sampling(decode: DecodeParams) -> Sampling {
    Sampling {
        temperature: decode.temperature,
        top_p: decode.top_p,
        max_tokens: decode.max_tokens,
    }
}

fn into_llm_error(e: LlmClientError) -> LlmError {
    match e {
        LlmClientError::EmptyResponse => LlmError::Empty,
        other => LlmError::Backend(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_backend_named_after_provider() {
        let backend =
            OpenAiCompatBackend::from_config(&ProviderConfig::new("ollama/llama3.3")).unwrap();
        assert_eq!(backend.name(), "ollama/llama3.3");
        assert_eq!(backend.client().model(), "llama3.3");
    }

    #[test]
    fn test_decode_params_map_to_sampling() {
        let s = sampling(DecodeParams::link_discovery());
        assert_eq!(s.temperature, 0.0);
        assert_eq!(s.top_p, 0.9);
        assert_eq!(s.max_tokens, 20000);
    }

    #[test]
    fn test_empty_response_maps_to_empty() {
        assert!(matches!(into_llm_error(LlmClientError::EmptyResponse), LlmError::Empty));
        assert!(matches!(
            into_llm_error(LlmClientError::Network("refused".into())),
            LlmError::Backend(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_backend_error() {
        let config = ProviderConfig::new("ollama/llama3.3").with_base_url("http://127.0.0.1:9/v1");
        let backend = OpenAiCompatBackend::from_config(&config).unwrap();

        let request = LlmRequest {
            schema_name: "LinksResponse".into(),
            schema: serde_json::json!({"type": "object"}),
            instruction: "find links".into(),
            content: "homepage".into(),
            decode: DecodeParams::link_discovery(),
            source_url: Url::parse("https://x.com").unwrap(),
        };

        let err = backend.extract(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Backend(_)));
    }
}
