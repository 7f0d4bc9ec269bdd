//! Pipeline and provider configuration.

use llm_client::{LlmClient, LlmClientError, Provider, ProviderKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

use crate::traits::fetcher::FetchConfig;

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini/gemini-2.0-flash";

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Output language for extracted company text.
    ///
    /// If set, company pages are translated into this language. If None,
    /// the source language is preserved.
    pub output_language: Option<String>,

    /// Maximum number of fetch + extract operations in flight. Default: 5.
    pub concurrency: usize,

    /// Fetch settings applied to every page
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Cap on the number of discovered links that get extracted
    pub max_about_links: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_language: None,
            concurrency: 5,
            fetch: FetchConfig::default(),
            max_about_links: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output language.
    pub fn with_output_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.output_language = (!language.trim().is_empty()).then_some(language);
        self
    }

    /// Set concurrency. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Set the page timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch.timeout = timeout;
        self
    }

    pub fn with_max_about_links(mut self, max: usize) -> Self {
        self.max_about_links = Some(max);
        self
    }
}

/// LLM provider selection with a redacted API token.
pub struct ProviderConfig {
    /// `<provider>/<model>` id, e.g. `gemini/gemini-2.0-flash`
    pub id: String,

    pub api_token: Option<SecretString>,

    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api_token: None,
            base_url: None,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.api_token = Some(SecretString::from(token));
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Resolve the token and endpoint from the environment.
    ///
    /// `LLM_API_KEY` wins over the provider-specific key (`GEMINI_API_KEY`,
    /// `OPENAI_API_KEY`). `LLM_BASE_URL` overrides the endpoint.
    pub fn from_env(id: impl Into<String>) -> Result<Self, LlmClientError> {
        let mut config = Self::new(id);
        let provider = config.provider()?;

        let token = non_empty_var("LLM_API_KEY")
            .or_else(|| provider_key_var(provider.kind).and_then(non_empty_var));
        if let Some(token) = token {
            config = config.with_api_token(token);
        }
        if let Some(url) = non_empty_var("LLM_BASE_URL") {
            config = config.with_base_url(url);
        }

        Ok(config)
    }

    /// Parse the provider id.
    pub fn provider(&self) -> Result<Provider, LlmClientError> {
        self.id.parse()
    }

    /// Build an LLM client for this provider.
    pub fn build_client(&self) -> Result<LlmClient, LlmClientError> {
        let token = self.api_token.as_ref().map(|t| t.expose_secret().to_string());
        let client = LlmClient::new(self.provider()?, token)?;

        Ok(match &self.base_url {
            Some(url) => client.with_base_url(url.clone()),
            None => client,
        })
    }
}

impl Clone for ProviderConfig {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            api_token: self
                .api_token
                .as_ref()
                .map(|t| SecretString::from(t.expose_secret().to_string())),
            base_url: self.base_url.clone(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn provider_key_var(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::OpenAI => Some("OPENAI_API_KEY"),
        ProviderKind::Gemini => Some("GEMINI_API_KEY"),
        ProviderKind::Ollama => None,
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
