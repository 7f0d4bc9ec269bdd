//! Page fetcher trait.
//!
//! A fetcher turns a URL into rendered page content. Implementations range
//! from plain HTTP to hosted headless browsers; the pipeline only sees this
//! trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::FetchResult;

/// Per-fetch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Always hit the origin instead of any cache
    pub bypass_cache: bool,

    /// Minimum number of whitespace-separated tokens a page must carry
    pub min_content_tokens: usize,

    /// Page timeout
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            bypass_cache: true,
            min_content_tokens: 1,
            timeout: Duration::from_millis(80_000),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_content_tokens(mut self, min: usize) -> Self {
        self.min_content_tokens = min;
        self
    }

    pub fn with_cache(mut self) -> Self {
        self.bypass_cache = false;
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Rendered page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// Page content (markdown or plain text)
    pub content: String,

    /// Page title if available
    pub title: Option<String>,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    pub fn new(url: Url, content: impl Into<String>) -> Self {
        Self {
            url,
            content: content.into(),
            title: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of whitespace-separated tokens in the content.
    pub fn token_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Fetches rendered page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single page.
    ///
    /// Implementations should honour `config.timeout` and `config.bypass_cache`
    /// where the underlying engine supports them. The content threshold is
    /// enforced by the caller.
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> FetchResult<FetchedPage>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> FetchResult<FetchedPage> {
        (**self).fetch(url, config).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
