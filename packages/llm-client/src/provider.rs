//! Provider resolution.
//!
//! Provider ids follow the `<provider>/<model>` convention used by most
//! LLM routers, e.g. `gemini/gemini-2.0-flash` or `ollama/llama3.3`. Every
//! supported provider exposes an OpenAI-compatible chat completions endpoint,
//! so resolution only has to pick the base URL and the model name.

use std::fmt;
use std::str::FromStr;

use crate::error::LlmClientError;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Known provider families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Gemini,
    Ollama,
}

impl ProviderKind {
    /// Default OpenAI-compatible base URL for this provider.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAI => OPENAI_BASE_URL,
            Self::Gemini => GEMINI_BASE_URL,
            Self::Ollama => OLLAMA_BASE_URL,
        }
    }

    /// Local providers accept requests without an API key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }
}

/// A resolved provider: family, model and endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
}

impl Provider {
    /// Override the base URL (proxies, self-hosted gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl FromStr for Provider {
    type Err = LlmClientError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let (prefix, model) = id
            .split_once('/')
            .ok_or_else(|| LlmClientError::Config(format!("provider id must be <provider>/<model>: {id}")))?;

        let model = model.trim();
        if model.is_empty() {
            return Err(LlmClientError::Config(format!("missing model in provider id: {id}")));
        }

        let kind = match prefix.trim().to_ascii_lowercase().as_str() {
            "openai" => ProviderKind::OpenAI,
            "gemini" | "google" => ProviderKind::Gemini,
            "ollama" => ProviderKind::Ollama,
            other => {
                return Err(LlmClientError::Config(format!("unsupported provider: {other}")));
            }
        };

        Ok(Self {
            kind,
            model: model.to_string(),
            base_url: kind.default_base_url().to_string(),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.prefix(), self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gemini() {
        let provider: Provider = "gemini/gemini-2.0-flash".parse().unwrap();
        assert_eq!(provider.kind, ProviderKind::Gemini);
        assert_eq!(provider.model, "gemini-2.0-flash");
        assert_eq!(provider.base_url, GEMINI_BASE_URL);
        assert_eq!(provider.to_string(), "gemini/gemini-2.0-flash");
    }

    #[test]
    fn test_parse_ollama_model_with_tag() {
        let provider: Provider = "ollama/llama3.3:70b".parse().unwrap();
        assert_eq!(provider.kind, ProviderKind::Ollama);
        assert_eq!(provider.model, "llama3.3:70b");
        assert!(!provider.kind.requires_api_key());
    }

    #[test]
    fn test_rejects_unknown_or_malformed() {
        assert!("anthropic/claude".parse::<Provider>().is_err());
        assert!("gpt-4o".parse::<Provider>().is_err());
        assert!("openai/".parse::<Provider>().is_err());
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let provider = "openai/gpt-4o-mini"
            .parse::<Provider>()
            .unwrap()
            .with_base_url("http://proxy.local/v1/");
        assert_eq!(provider.base_url, "http://proxy.local/v1");
    }
}
