//! Link discovery on the company homepage.

use indexmap::IndexSet;
use tracing::{info, warn};
use url::Url;

use super::prompts::LINK_DISCOVERY_PROMPT;
use crate::client::ExtractionClient;
use crate::traits::{fetcher::PageFetcher, llm::{DecodeParams, LlmBackend}};
use crate::types::link::{LinkCandidate, LinksResponse};

/// Find links on `homepage` that likely lead to company-values content.
///
/// Never fails: if the homepage cannot be extracted the result is empty and
/// the run continues without company data.
pub async fn discover_about_links<F: PageFetcher, L: LlmBackend>(
    client: &ExtractionClient<F, L>,
    homepage: &Url,
) -> IndexSet<LinkCandidate> {
    let response = match client
        .extract_one::<LinksResponse>(homepage, LINK_DISCOVERY_PROMPT, DecodeParams::link_discovery())
        .await
    {
        Ok(extracted) => extracted.record,
        Err(e) => {
            warn!(
                homepage = %homepage,
                reason = %e.reason(),
                error = %e,
                "Link discovery failed, continuing without company pages"
            );
            return IndexSet::new();
        }
    };

    let links = collect_links(&response, homepage, client.config().max_about_links);

    info!(
        homepage = %homepage,
        suggested = response.links.len(),
        kept = links.len(),
        "Discovered about links"
    );

    links
}

/// Validate, resolve and deduplicate suggested links.
pub(crate) fn collect_links(
    response: &LinksResponse,
    homepage: &Url,
    max: Option<usize>,
) -> IndexSet<LinkCandidate> {
    let mut links = IndexSet::new();

    for raw in &response.links {
        if max.is_some_and(|max| links.len() >= max) {
            break;
        }

        match LinkCandidate::from_raw(raw, homepage) {
            Ok(candidate) => {
                links.insert(candidate);
            }
            Err(rejection) => {
                warn!(url = %raw.url, label = %raw.label, %rejection, "Dropping suggested link");
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::testing::{MockFetcher, MockLlm};
    use crate::types::link::RawLink;

    fn homepage() -> Url {
        Url::parse("https://www.appliedintuition.com/").unwrap()
    }

    fn raw(label: &str, url: &str) -> RawLink {
        RawLink {
            label: label.into(),
            url: url.into(),
        }
    }

    #[test]
    fn test_duplicates_are_removed() {
        let response = LinksResponse {
            links: vec![
                raw("Careers", "https://www.appliedintuition.com/careers"),
                raw("Careers", "https://www.appliedintuition.com/careers"),
                raw("Careers", "/careers"),
            ],
        };

        let links = collect_links(&response, &homepage(), None);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url.as_str(), "https://www.appliedintuition.com/careers");
    }

    #[test]
    fn test_malformed_links_are_dropped() {
        let response = LinksResponse {
            links: vec![
                raw("Careers", "https://www.appliedintuition.com/%3C/careers%3E"),
                raw("Mail", "mailto:jobs@appliedintuition.com"),
                raw("About", "/about"),
            ],
        };

        let links = collect_links(&response, &homepage(), None);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://www.appliedintuition.com/about"]);
    }

    #[test]
    fn test_cap_counts_kept_links_only() {
        let response = LinksResponse {
            links: vec![
                raw("Bad", "javascript:void(0)"),
                raw("About", "/about"),
                raw("Culture", "/culture"),
                raw("Team", "/team"),
            ],
        };

        let links = collect_links(&response, &homepage(), Some(2));
        let labels: Vec<&str> = links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["About", "Culture"]);
    }

    #[tokio::test]
    async fn test_failure_yields_empty_set() {
        let fetcher = MockFetcher::new().with_page(homepage(), "Welcome to Applied Intuition");
        let llm = MockLlm::new().with_response("LinksResponse", homepage(), "not json at all");
        let client = ExtractionClient::new(fetcher, llm);

        assert!(discover_about_links(&client, &homepage()).await.is_empty());

        let calls = client.llm().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].decode.max_tokens, 20000);
    }

    #[tokio::test]
    async fn test_unreachable_homepage_yields_empty_set() {
        let client = ExtractionClient::new(MockFetcher::new(), MockLlm::new());
        let err = client
            .extract_one::<LinksResponse>(&homepage(), LINK_DISCOVERY_PROMPT, DecodeParams::link_discovery())
            .await
            .unwrap_err();
        assert_eq!(err.reason(), FailureReason::Fetch);

        assert!(discover_about_links(&client, &homepage()).await.is_empty());
    }
}
