//! Plain HTTP fetcher using reqwest + scraper + htmd.
//!
//! Fetches the HTML, drops scripts and styles and converts the body to
//! markdown. No JavaScript rendering, so client-side rendered sites come
//! back thin; use the Firecrawl fetcher for those.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchConfig, FetchedPage, PageFetcher};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
];

const NOISE_SELECTORS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "template"];

/// Fetcher for static HTML sites.
pub struct HttpFetcher {
    client: reqwest::Client,

    /// Narrow pages to their main content area
    main_only: bool,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        Self::build(reqwest::Client::builder())
    }

    /// Fetcher that gives up connecting after `timeout`.
    pub fn with_connect_timeout(timeout: Duration) -> FetchResult<Self> {
        Self::build(reqwest::Client::builder().connect_timeout(timeout))
    }

    fn build(builder: reqwest::ClientBuilder) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = builder
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            main_only: false,
        })
    }

    /// Keep only `<main>`, `<article>` or a similar content area when the
    /// page has one.
    ///
    /// Not suitable for homepages: link discovery needs the navigation menus.
    pub fn main_content_only(mut self) -> Self {
        self.main_only = true;
        self
    }

    async fn fetch_html(&self, url: &Url, config: &FetchConfig) -> FetchResult<(Url, String)> {
        let mut request = self.client.get(url.as_str()).timeout(config.timeout);
        if config.bypass_cache {
            request = request
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(map_reqwest_error)?;
        Ok((final_url, html))
    }

    fn extract_title(document: &Html) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn extract_content(&self, document: &Html) -> String {
        if self.main_only {
            for selector in MAIN_SELECTORS.iter().filter_map(|s| Selector::parse(s).ok()) {
                if let Some(main) = document.select(&selector).next() {
                    return strip_noise(&main.html());
                }
            }
        }

        let body = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next().map(|b| b.html()))
            .unwrap_or_else(|| document.html());
        strip_noise(&body)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> FetchResult<FetchedPage> {
        debug!(url = %url, "Fetching page over HTTP");

        let (final_url, html) = self.fetch_html(url, config).await?;

        // Html is !Send, so parsing stays out of any await.
        let (title, markdown) = {
            let document = Html::parse_document(&html);
            let title = Self::extract_title(&document);
            (title, html_to_markdown(&self.extract_content(&document)))
        };

        let page = FetchedPage::new(final_url, markdown);
        Ok(match title {
            Some(title) => page.with_title(title),
            None => page,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(Box::new(e))
    }
}

fn strip_noise(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut result = html.to_string();
    for selector in NOISE_SELECTORS.iter().filter_map(|s| Selector::parse(s).ok()) {
        for element in fragment.select(&selector) {
            result = result.replace(&element.html(), "");
        }
    }
    result
}

fn html_to_markdown(html: &str) -> String {
    htmd::convert(html).unwrap_or_else(|_| {
        let document = Html::parse_fragment(html);
        document.root_element().text().collect::<Vec<_>>().join(" ")
    })
}
