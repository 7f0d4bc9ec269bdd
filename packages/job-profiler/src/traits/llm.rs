//! LLM backend trait.
//!
//! The backend receives page content, an instruction and a JSON schema, and
//! answers with text that should be a JSON document conforming to the
//! schema. Provider id and credentials are bound when the backend is built.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::LlmError;

/// Decoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodeParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl DecodeParams {
    /// Parameters for page content extraction.
    pub const fn content() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.9,
            max_tokens: 2000,
        }
    }

    /// Link lists run long, so discovery gets a larger output token limit.
    pub const fn link_discovery() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.9,
            max_tokens: 20000,
        }
    }
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self::content()
    }
}

/// One schema-constrained extraction request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub schema_name: String,
    pub schema: Value,
    pub instruction: String,
    pub content: String,
    pub decode: DecodeParams,

    /// Page the content was fetched from (for logging and tracing)
    pub source_url: Url,
}

/// Schema-constrained LLM backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Run one extraction and return the raw model output.
    async fn extract(&self, request: &LlmRequest) -> Result<String, LlmError>;

    /// Get the backend name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: LlmBackend + ?Sized> LlmBackend for std::sync::Arc<T> {
    async fn extract(&self, request: &LlmRequest) -> Result<String, LlmError> {
        (**self).extract(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
