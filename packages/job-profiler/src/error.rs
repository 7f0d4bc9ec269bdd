//! Typed errors for the profiling pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! fatal job failure from a skipped company page.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a [`PageFetcher`](crate::traits::fetcher::PageFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success status code
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Fetch exceeded its own timeout
    #[error("fetch timed out")]
    Timeout,

    /// Page rendered but carried less content than the configured threshold
    #[error("page has {tokens} content tokens, need at least {min}")]
    InsufficientContent { tokens: usize, min: usize },

    /// Fetcher could not be set up
    #[error("fetcher config error: {0}")]
    Config(String),
}

/// Errors raised by an [`LlmBackend`](crate::traits::llm::LlmBackend).
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend unreachable, rejected the request, or answered garbage
    #[error("LLM backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The model produced no content
    #[error("LLM returned no content")]
    Empty,
}

/// Why a single URL failed to produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Fetch,
    Timeout,
    Backend,
    EmptyResult,
    Validation,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Timeout => "timeout",
            Self::Backend => "backend",
            Self::EmptyResult => "empty_result",
            Self::Validation => "validation",
        };
        f.write_str(name)
    }
}

/// Failure of one fetch + extract operation.
///
/// Every variant carries the URL it belongs to so batch results can be
/// reported per link.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    /// Page could not be fetched or carried no usable content
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: FetchError,
    },

    /// The operation exceeded the page timeout
    #[error("timed out after {after:?}: {url}")]
    Timeout { url: Url, after: Duration },

    /// The LLM call itself failed
    #[error("LLM call failed for {url}: {source}")]
    Backend {
        url: Url,
        #[source]
        source: LlmError,
    },

    /// The LLM returned no or near-empty content
    #[error("empty extraction result for {url}")]
    EmptyResult { url: Url },

    /// The LLM output did not conform to the schema
    #[error("validation failed for {url}: {message}")]
    Validation { url: Url, message: String, raw: String },
}

impl ExtractionFailure {
    /// The URL this failure belongs to.
    pub fn url(&self) -> &Url {
        match self {
            Self::Fetch { url, .. }
            | Self::Timeout { url, .. }
            | Self::Backend { url, .. }
            | Self::EmptyResult { url }
            | Self::Validation { url, .. } => url,
        }
    }

    /// Short machine-readable reason.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Fetch { .. } => FailureReason::Fetch,
            Self::Timeout { .. } => FailureReason::Timeout,
            Self::Backend { source: LlmError::Empty, .. } => FailureReason::EmptyResult,
            Self::Backend { .. } => FailureReason::Backend,
            Self::EmptyResult { .. } => FailureReason::EmptyResult,
            Self::Validation { .. } => FailureReason::Validation,
        }
    }

    /// Raw LLM output for validation failures.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Validation { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The mandatory job posting could not be extracted
    #[error("job extraction failed: {0}")]
    Job(#[from] ExtractionFailure),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for extraction operations.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionFailure>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;
