//! Error types for the LLM client.

use thiserror::Error;

/// Result type for LLM client operations.
pub type Result<T> = std::result::Result<T, LlmClientError>;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmClientError {
    /// Configuration error (unknown provider, missing API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The model answered without any content (refusal or empty choice list)
    #[error("Empty response from model")]
    EmptyResponse,
}

impl LlmClientError {
    /// Whether the error came from the transport rather than the model.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
