//! Extraction client: fetch a page, run one schema-constrained LLM call.
//!
//! The client performs exactly one attempt per URL. Batches run concurrently
//! (bounded by a semaphore) and results come back in input order, one entry
//! per URL.

use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::config::PipelineConfig;
use crate::error::{ExtractionFailure, ExtractionResult, FetchError};
use crate::schema::{ExtractionSchema, SchemaDescriptor};
use crate::traits::{
    fetcher::{FetchedPage, PageFetcher},
    llm::{DecodeParams, LlmBackend, LlmRequest},
};
use llm_client::strip_code_blocks;

/// Raw JSON returned for one URL, before typed validation.
#[derive(Debug, Clone)]
pub struct RawExtraction {
    pub url: Url,
    pub value: Value,

    /// Title reported by the fetcher, if any
    pub page_title: Option<String>,
}

/// A validated record together with the page it came from.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub url: Url,
    pub record: T,
    pub page_title: Option<String>,
}

/// Fetch + extract client, generic over its two collaborators.
pub struct ExtractionClient<F, L> {
    fetcher: F,
    llm: L,
    config: PipelineConfig,
    permits: Arc<Semaphore>,
}

impl<F: PageFetcher, L: LlmBackend> ExtractionClient<F, L> {
    pub fn new(fetcher: F, llm: L) -> Self {
        Self::with_config(fetcher, llm, PipelineConfig::default())
    }

    pub fn with_config(fetcher: F, llm: L, config: PipelineConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
        Self {
            fetcher,
            llm,
            config,
            permits,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Extract raw JSON from every target, preserving input order.
    pub async fn extract(
        &self,
        targets: &[Url],
        schema: &SchemaDescriptor,
        instruction: &str,
        decode: DecodeParams,
    ) -> Vec<ExtractionResult<RawExtraction>> {
        let futures = targets
            .iter()
            .map(|url| self.extract_single(url, schema, instruction, decode));
        join_all(futures).await
    }

    /// Extract and validate a record from every target, preserving input order.
    pub async fn extract_records<T: ExtractionSchema>(
        &self,
        targets: &[Url],
        instruction: &str,
        decode: DecodeParams,
    ) -> Vec<ExtractionResult<Extracted<T>>> {
        let schema = T::descriptor();
        self.extract(targets, &schema, instruction, decode)
            .await
            .into_iter()
            .map(|result| result.and_then(validate_record::<T>))
            .collect()
    }

    /// Extract and validate a single record.
    pub async fn extract_one<T: ExtractionSchema>(
        &self,
        url: &Url,
        instruction: &str,
        decode: DecodeParams,
    ) -> ExtractionResult<Extracted<T>> {
        let schema = T::descriptor();
        self.extract_single(url, &schema, instruction, decode)
            .await
            .and_then(validate_record::<T>)
    }

    /// One fetch + extract operation under the page timeout.
    ///
    /// The timeout starts once a concurrency permit is held, so time spent
    /// queued behind other URLs does not count against it. The permit is
    /// dropped with this future.
    async fn extract_single(
        &self,
        url: &Url,
        schema: &SchemaDescriptor,
        instruction: &str,
        decode: DecodeParams,
    ) -> ExtractionResult<RawExtraction> {
        let timeout = self.config.fetch.timeout;

        // The semaphore is never closed, so acquire only fails in theory.
        let _permit = self.permits.acquire().await.ok();

        let operation = async {
            let page = self.fetch_page(url).await?;

            let request = LlmRequest {
                schema_name: schema.name.clone(),
                schema: schema.json_schema.clone(),
                instruction: instruction.to_string(),
                content: page.content,
                decode,
                source_url: url.clone(),
            };

            debug!(
                url = %url,
                schema = %schema.name,
                backend = self.llm.name(),
                content_len = request.content.len(),
                max_tokens = decode.max_tokens,
                "Running LLM extraction"
            );

            let raw = self
                .llm
                .extract(&request)
                .await
                .map_err(|source| ExtractionFailure::Backend {
                    url: url.clone(),
                    source,
                })?;

            let value = normalize_output(url, &raw)?;

            Ok::<_, ExtractionFailure>(RawExtraction {
                url: url.clone(),
                value,
                page_title: page.title,
            })
        };

        match tokio::time::timeout(timeout, operation).await {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(url = %url, reason = %e.reason(), error = %e, "Extraction failed");
                }
                result
            }
            Err(_) => {
                warn!(url = %url, timeout_ms = timeout.as_millis(), "Extraction timed out");
                Err(ExtractionFailure::Timeout {
                    url: url.clone(),
                    after: timeout,
                })
            }
        }
    }

    async fn fetch_page(&self, url: &Url) -> ExtractionResult<FetchedPage> {
        let fetch = &self.config.fetch;

        let page = self
            .fetcher
            .fetch(url, fetch)
            .await
            .map_err(|source| ExtractionFailure::Fetch {
                url: url.clone(),
                source,
            })?;

        let tokens = page.token_count();
        if tokens < fetch.min_content_tokens.max(1) {
            return Err(ExtractionFailure::Fetch {
                url: url.clone(),
                source: FetchError::InsufficientContent {
                    tokens,
                    min: fetch.min_content_tokens.max(1),
                },
            });
        }

        debug!(
            url = %url,
            fetcher = self.fetcher.name(),
            tokens = tokens,
            "Fetched page"
        );

        Ok(page)
    }
}

/// Parse model output into a single JSON value.
///
/// Code fences are stripped. Some backends answer with a list of blocks;
/// only the first block is used. Empty documents are reported as
/// `EmptyResult` rather than validation failures.
fn normalize_output(url: &Url, raw: &str) -> ExtractionResult<Value> {
    let text = strip_code_blocks(raw);
    if text.is_empty() {
        return Err(ExtractionFailure::EmptyResult { url: url.clone() });
    }

    let value: Value = serde_json::from_str(text).map_err(|e| ExtractionFailure::Validation {
        url: url.clone(),
        message: format!("output is not JSON: {e}"),
        raw: raw.to_string(),
    })?;

    let value = match value {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };

    if is_empty_value(&value) {
        return Err(ExtractionFailure::EmptyResult { url: url.clone() });
    }

    Ok(value)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn validate_record<T: ExtractionSchema>(raw: RawExtraction) -> ExtractionResult<Extracted<T>> {
    let RawExtraction {
        url,
        value,
        page_title,
    } = raw;

    let record: T = match serde_json::from_value(value.clone()) {
        Ok(record) => record,
        Err(e) => {
            return Err(ExtractionFailure::Validation {
                url,
                message: e.to_string(),
                raw: value.to_string(),
            });
        }
    };

    if let Err(message) = record.validate() {
        return Err(ExtractionFailure::Validation {
            url,
            message,
            raw: value.to_string(),
        });
    }

    Ok(Extracted {
        url,
        record,
        page_title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::testing::{MockFetcher, MockLlm};
    use crate::types::job::JobPostingRecord;
    use std::time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn job_json(title: &str) -> String {
        serde_json::json!({
            "title": title,
            "company": "Applied Intuition",
            "about": "Autonomy software",
            "description": "Build ML systems",
            "requirements": "3+ years",
            "skills": [{"name": "Python", "count": 2}],
            "values": []
        })
        .to_string()
    }

    #[test]
    fn test_normalize_output_handles_fences_and_blocks() {
        let u = url("https://x.com");
        let value = normalize_output(&u, "```json\n[{\"a\": 1}, {\"a\": 2}]\n```").unwrap();
        assert_eq!(value["a"], 1);

        for empty in ["", "null", "{}", "[]", "[{}]", "\"  \""] {
            let err = normalize_output(&u, empty).unwrap_err();
            assert_eq!(err.reason(), FailureReason::EmptyResult, "input {empty:?}");
        }

        let err = normalize_output(&u, "not json").unwrap_err();
        assert_eq!(err.reason(), FailureReason::Validation);
        assert_eq!(err.raw(), Some("not json"));
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let a = url("https://x.com/a");
        let b = url("https://x.com/b");
        let c = url("https://x.com/c");

        let fetcher = MockFetcher::new()
            .with_page(a.clone(), "page a content")
            .with_delayed_page(b.clone(), "page b content", Duration::from_millis(50))
            .with_page(c.clone(), "page c content");
        let llm = MockLlm::new()
            .with_response("JobPostingRecord", a.clone(), job_json("A"))
            .with_response("JobPostingRecord", b.clone(), job_json("B"))
            .with_response("JobPostingRecord", c.clone(), job_json("C"));

        let client = ExtractionClient::new(fetcher, llm);
        let results = client
            .extract_records::<JobPostingRecord>(&[a, b, c], "extract", DecodeParams::content())
            .await;

        let titles: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().record.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_empty_page_is_fetch_failure_without_llm_call() {
        let u = url("https://x.com/empty");
        let fetcher = MockFetcher::new().with_page(u.clone(), "   ");
        let llm = MockLlm::new();

        let client = ExtractionClient::new(fetcher, llm);
        let err = client
            .extract_one::<JobPostingRecord>(&u, "extract", DecodeParams::content())
            .await
            .unwrap_err();

        assert_eq!(err.reason(), FailureReason::Fetch);
        assert!(client.llm().calls().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_surfaces_per_url() {
        let slow = url("https://x.com/slow");
        let fast = url("https://x.com/fast");
        let fetcher = MockFetcher::new()
            .with_delayed_page(slow.clone(), "slow page", Duration::from_secs(5))
            .with_page(fast.clone(), "fast page");
        let llm = MockLlm::new().with_response("JobPostingRecord", fast.clone(), job_json("Fast"));

        let options = PipelineConfig::default().with_timeout(Duration::from_millis(100));
        let client = ExtractionClient::with_config(fetcher, llm, options);
        let results = client
            .extract_records::<JobPostingRecord>(&[slow, fast], "extract", DecodeParams::content())
            .await;

        assert_eq!(results[0].as_ref().unwrap_err().reason(), FailureReason::Timeout);
        assert_eq!(results[1].as_ref().unwrap().record.title, "Fast");
    }

    #[tokio::test]
    async fn test_queued_urls_do_not_time_out() {
        let urls: Vec<Url> = ["a", "b", "c"]
            .iter()
            .map(|p| url(&format!("https://x.com/{p}")))
            .collect();

        let mut fetcher = MockFetcher::new();
        let mut llm = MockLlm::new();
        for u in &urls {
            fetcher = fetcher.with_delayed_page(u.clone(), "page", Duration::from_millis(100));
            llm = llm.with_response("JobPostingRecord", u.clone(), job_json(u.path()));
        }

        let config = PipelineConfig::default()
            .with_concurrency(1)
            .with_timeout(Duration::from_millis(150));
        let client = ExtractionClient::with_config(fetcher, llm, config);
        let results = client
            .extract_records::<JobPostingRecord>(&urls, "extract", DecodeParams::content())
            .await;

        let titles: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().record.title)
            .collect();
        assert_eq!(titles, vec!["/a", "/b", "/c"]);
        assert_eq!(client.fetcher().fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_invalid_record_carries_raw_output() {
        let u = url("https://x.com/job");
        let fetcher = MockFetcher::new().with_page(u.clone(), "job page");
        let llm = MockLlm::new().with_response("JobPostingRecord", u.clone(), r#"{"title": "x"}"#);

        let client = ExtractionClient::new(fetcher, llm);
        let err = client
            .extract_one::<JobPostingRecord>(&u, "extract", DecodeParams::content())
            .await
            .unwrap_err();

        assert_eq!(err.reason(), FailureReason::Validation);
        assert!(err.raw().unwrap().contains("\"title\""));
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_decode_params() {
        let u = url("https://x.com/job");
        let fetcher = MockFetcher::new().with_page(u.clone(), "job page");
        let llm = MockLlm::new().with_response("JobPostingRecord", u.clone(), job_json("ML Engineer"));

        let client = ExtractionClient::new(fetcher, llm);
        client
            .extract_one::<JobPostingRecord>(&u, "find the job", DecodeParams::link_discovery())
            .await
            .unwrap();

        let calls = client.llm().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].schema_name, "JobPostingRecord");
        assert_eq!(calls[0].instruction, "find the job");
        assert_eq!(calls[0].decode.max_tokens, 20000);
        assert_eq!(calls[0].content, "job page");
    }
}
