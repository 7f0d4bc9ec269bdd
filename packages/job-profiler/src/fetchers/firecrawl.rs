//! Firecrawl-based fetcher.
//!
//! Uses the Firecrawl scrape API for JavaScript-heavy sites. Firecrawl
//! renders the page in a headless browser and returns markdown.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchConfig, FetchedPage, PageFetcher};

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// Fetcher backed by the Firecrawl scrape endpoint.
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = FirecrawlFetcher::from_env()?;
/// let page = fetcher.fetch(&url, &FetchConfig::default()).await?;
/// ```
pub struct FirecrawlFetcher {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_age: Option<u64>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    metadata: Option<PageMetadata>,
}

#[derive(Deserialize)]
struct PageMetadata {
    title: Option<String>,
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
}

impl FirecrawlFetcher {
    /// Create a new Firecrawl fetcher with the given API key.
    pub fn new(api_key: impl Into<String>) -> FetchResult<Self> {
        let api_key: String = api_key.into();
        let client = Client::builder()
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key: SecretString::from(api_key),
            base_url: FIRECRAWL_API_URL.to_string(),
        })
    }

    /// Create from environment variable `FIRECRAWL_API_KEY`.
    pub fn from_env() -> FetchResult<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FetchError::Config("FIRECRAWL_API_KEY is not set".to_string()))?;
        Self::new(api_key)
    }

    /// Point at a self-hosted Firecrawl instance.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn scrape_request<'a>(url: &'a Url, config: &FetchConfig) -> ScrapeRequest<'a> {
        ScrapeRequest {
            url: url.as_str(),
            formats: ["markdown"],
            timeout: config.timeout.as_millis() as u64,
            max_age: config.bypass_cache.then_some(0),
        }
    }
}

#[async_trait]
impl PageFetcher for FirecrawlFetcher {
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> FetchResult<FetchedPage> {
        debug!(url = %url, "Scraping page with Firecrawl");

        let response = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(config.timeout)
            .json(&Self::scrape_request(url, config))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        into_page(url, body)
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}

fn into_page(url: &Url, body: ScrapeResponse) -> FetchResult<FetchedPage> {
    let data = match body.data {
        Some(data) if body.success => data,
        _ => {
            let message = body
                .error
                .unwrap_or_else(|| "Firecrawl scrape was not successful".to_string());
            return Err(FetchError::Http(Box::new(std::io::Error::other(message))));
        }
    };

    let metadata = data.metadata;
    let final_url = metadata
        .as_ref()
        .and_then(|m| m.source_url.as_deref())
        .and_then(|u| Url::parse(u).ok())
        .unwrap_or_else(|| url.clone());

    let page = FetchedPage::new(final_url, data.markdown.unwrap_or_default());
    Ok(match metadata.and_then(|m| m.title).filter(|t| !t.trim().is_empty()) {
        Some(title) => page.with_title(title),
        None => page,
    })
}
