//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without network access or
//! real LLM calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

use crate::error::{FetchError, FetchResult, LlmError};
use crate::traits::{
    fetcher::{FetchConfig, FetchedPage, PageFetcher},
    llm::{LlmBackend, LlmRequest},
};

#[derive(Debug, Clone)]
struct MockPage {
    content: String,
    title: Option<String>,
    delay: Duration,
}

/// A mock fetcher serving canned pages.
///
/// URLs without a canned page fail with HTTP 404.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<Url, MockPage>>>,

    /// Call tracking for assertions
    fetches: Arc<RwLock<Vec<Url>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    pub fn with_page(self, url: Url, content: impl Into<String>) -> Self {
        self.insert(url, content.into(), None, Duration::ZERO)
    }

    /// Add a page that reports a title.
    pub fn with_titled_page(self, url: Url, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(url, content.into(), Some(title.into()), Duration::ZERO)
    }

    /// Add a page that takes `delay` to load.
    pub fn with_delayed_page(self, url: Url, content: impl Into<String>, delay: Duration) -> Self {
        self.insert(url, content.into(), None, delay)
    }

    fn insert(self, url: Url, content: String, title: Option<String>, delay: Duration) -> Self {
        self.pages.write().unwrap().insert(
            url,
            MockPage {
                content,
                title,
                delay,
            },
        );
        self
    }

    /// URLs fetched so far, in call order.
    pub fn fetches(&self) -> Vec<Url> {
        self.fetches.read().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, _config: &FetchConfig) -> FetchResult<FetchedPage> {
        self.fetches.write().unwrap().push(url.clone());

        let page = self.pages.read().unwrap().get(url).cloned();
        let Some(page) = page else {
            return Err(FetchError::Status { status: 404 });
        };

        if !page.delay.is_zero() {
            tokio::time::sleep(page.delay).await;
        }

        let fetched = FetchedPage::new(url.clone(), page.content);
        Ok(match page.title {
            Some(title) => fetched.with_title(title),
            None => fetched,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
    Empty,
}

/// A mock LLM backend returning canned output per `(schema, url)`.
///
/// Requests without a canned reply fail as backend errors.
#[derive(Default, Clone)]
pub struct MockLlm {
    replies: Arc<RwLock<HashMap<(String, Url), MockReply>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<LlmRequest>>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `schema` on `url` with `output`.
    pub fn with_response(self, schema: impl Into<String>, url: Url, output: impl Into<String>) -> Self {
        self.insert(schema.into(), url, MockReply::Text(output.into()))
    }

    /// Fail requests for `schema` on `url` with a backend error.
    pub fn with_failure(self, schema: impl Into<String>, url: Url, message: impl Into<String>) -> Self {
        self.insert(schema.into(), url, MockReply::Fail(message.into()))
    }

    /// Answer requests for `schema` on `url` with no content at all.
    pub fn with_empty_response(self, schema: impl Into<String>, url: Url) -> Self {
        self.insert(schema.into(), url, MockReply::Empty)
    }

    fn insert(self, schema: String, url: Url, reply: MockReply) -> Self {
        self.replies.write().unwrap().insert((schema, url), reply);
        self
    }

    /// Get all requests made to this mock.
    pub fn calls(&self) -> Vec<LlmRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl LlmBackend for MockLlm {
    async fn extract(&self, request: &LlmRequest) -> Result<String, LlmError> {
        self.calls.write().unwrap().push(request.clone());

        let key = (request.schema_name.clone(), request.source_url.clone());
        let reply = self.replies.read().unwrap().get(&key).cloned();

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Empty) => Err(LlmError::Empty),
            Some(MockReply::Fail(message)) => Err(LlmError::Backend(message.into())),
            None => Err(LlmError::Backend(
                format!("no canned reply for {} on {}", key.0, key.1).into(),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
