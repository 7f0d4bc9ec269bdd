//! Page fetcher implementations.

pub mod firecrawl;
pub mod http;

pub use firecrawl::FirecrawlFetcher;
pub use http::HttpFetcher;
