//! Link candidates produced by discovery.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Markup remnants that show up in LLM-produced URLs, raw or percent-encoded.
const MARKUP_FRAGMENTS: &[&str] = &["<", ">", "%3c", "%3e", "\"", "%22"];

/// A navigation link that plausibly leads to company-values content.
///
/// Equality and hashing are structural over `(label, url)`, so a set of
/// candidates drops repeated suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkCandidate {
    pub label: String,
    pub url: Url,
}

impl LinkCandidate {
    pub fn new(label: impl Into<String>, url: Url) -> Self {
        Self {
            label: label.into(),
            url,
        }
    }

    /// Turn a model-suggested link into a candidate.
    ///
    /// Relative URLs resolve against `base`. Non-HTTP schemes and URLs
    /// carrying markup remnants are rejected.
    pub fn from_raw(raw: &RawLink, base: &Url) -> Result<Self, LinkRejection> {
        let href = raw.url.trim();
        if href.is_empty() {
            return Err(LinkRejection::Empty);
        }

        let lowered = href.to_ascii_lowercase();
        if MARKUP_FRAGMENTS.iter().any(|f| lowered.contains(f)) {
            return Err(LinkRejection::Markup(href.to_string()));
        }

        let url = base
            .join(href)
            .map_err(|_| LinkRejection::Unparsable(href.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(LinkRejection::Scheme(url.scheme().to_string()));
        }

        let label = match raw.label.trim() {
            "" => url.path().to_string(),
            label => label.to_string(),
        };
        Ok(Self::new(label, url))
    }
}

/// Why a suggested link was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkRejection {
    #[error("empty URL")]
    Empty,

    #[error("markup remnants in URL: {0}")]
    Markup(String),

    #[error("unparsable URL: {0}")]
    Unparsable(String),

    #[error("unsupported scheme: {0}")]
    Scheme(String),
}

/// A link as the model reports it, before URL validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawLink {
    /// Name of the link to a page that could contain information about the company
    pub label: String,

    /// URL of the link to a page that could contain information about the company
    pub url: String,
}

/// Link discovery output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LinksResponse {
    /// A list of links on the page that could contain information about the company
    pub links: Vec<RawLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn base() -> Url {
        Url::parse("https://www.appliedintuition.com/").unwrap()
    }

    fn raw(label: &str, url: &str) -> RawLink {
        RawLink {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_structural_equality_dedups() {
        let a = LinkCandidate::from_raw(&raw("Careers", "https://x.com/careers"), &base()).unwrap();
        let b = LinkCandidate::from_raw(&raw("Careers", "https://x.com/careers"), &base()).unwrap();
        let c = LinkCandidate::from_raw(&raw("Jobs", "https://x.com/careers"), &base()).unwrap();

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_relative_url_resolves_against_base() {
        let link = LinkCandidate::from_raw(&raw("About", "/about"), &base()).unwrap();
        assert_eq!(link.url.as_str(), "https://www.appliedintuition.com/about");
    }

    #[test]
    fn test_rejects_markup_remnants() {
        let err = LinkCandidate::from_raw(
            &raw("Careers", "https://www.appliedintuition.com/%3C/careers%3E"),
            &base(),
        )
        .unwrap_err();
        assert!(matches!(err, LinkRejection::Markup(_)));

        assert!(LinkCandidate::from_raw(&raw("About", "<a href=\"/about\">"), &base()).is_err());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = LinkCandidate::from_raw(&raw("Mail", "mailto:jobs@x.com"), &base()).unwrap_err();
        assert_eq!(err, LinkRejection::Scheme("mailto".to_string()));
        assert_eq!(err.to_string(), "unsupported scheme: mailto");
    }

    #[test]
    fn test_blank_label_falls_back_to_path() {
        let link = LinkCandidate::from_raw(&raw(" ", "/values"), &base()).unwrap();
        assert_eq!(link.label, "/values");
    }
}
