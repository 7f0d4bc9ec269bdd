//! The Pipeline - entry point for profiling a job posting.

use futures::future::try_join;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use super::{company::aggregate_company_profile, discovery::discover_about_links, job::extract_job};
use crate::client::ExtractionClient;
use crate::config::PipelineConfig;
use crate::error::{ExtractionFailure, PipelineError, Result};
use crate::traits::{fetcher::PageFetcher, llm::LlmBackend};
use crate::types::profile::CombinedJobProfile;

/// Profiles a job posting and, optionally, the company behind it.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(HttpFetcher::new()?, llm);
///
/// let profile = pipeline.run(&job_url, Some(&homepage)).await?;
/// if let Some(about) = &profile.about {
///     let (n, m) = about.coverage();
///     println!("company profile based on {n} of {m} pages");
/// }
/// ```
pub struct Pipeline<F: PageFetcher, L: LlmBackend> {
    client: ExtractionClient<F, L>,
}

impl<F: PageFetcher, L: LlmBackend> Pipeline<F, L> {
    /// Create a pipeline with default configuration.
    pub fn new(fetcher: F, llm: L) -> Self {
        Self::with_config(fetcher, llm, PipelineConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(fetcher: F, llm: L, config: PipelineConfig) -> Self {
        Self {
            client: ExtractionClient::with_config(fetcher, llm, config),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.client.config()
    }

    /// The underlying extraction client.
    pub fn client(&self) -> &ExtractionClient<F, L> {
        &self.client
    }

    /// Run the pipeline.
    ///
    /// Fails only when the job posting cannot be extracted. Company data is
    /// best effort: `about` is absent when no homepage is given or when no
    /// company page could be extracted.
    pub async fn run(&self, job_url: &Url, homepage: Option<&Url>) -> Result<CombinedJobProfile> {
        info!(job_url = %job_url, homepage = ?homepage.map(Url::as_str), "Starting pipeline");

        let Some(homepage) = homepage else {
            let job_posting = extract_job(&self.client, job_url).await?;
            return Ok(CombinedJobProfile {
                job_posting,
                about: None,
            });
        };

        // Discovery never fails, so a job failure is the only way try_join
        // short-circuits; the in-flight discovery is dropped with it.
        let (job_posting, links) = try_join(extract_job(&self.client, job_url), async {
            Ok::<_, ExtractionFailure>(discover_about_links(&self.client, homepage).await)
        })
        .await?;

        let profile =
            aggregate_company_profile(&self.client, &links, Some(job_posting.title.as_str())).await;

        let about = if profile.is_empty() {
            info!(homepage = %homepage, "No company pages extracted, omitting about");
            None
        } else {
            Some(profile)
        };

        Ok(CombinedJobProfile { job_posting, about })
    }

    /// Run the pipeline with cancellation support.
    ///
    /// In-flight fetches and LLM calls are dropped when `cancel` fires.
    pub async fn run_with_cancel(
        &self,
        job_url: &Url,
        homepage: Option<&Url>,
        cancel: CancellationToken,
    ) -> Result<CombinedJobProfile> {
        tokio::select! {
            result = self.run(job_url, homepage) => result,
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::testing::{MockFetcher, MockLlm};
    use std::time::Duration;

    fn job_url() -> Url {
        Url::parse("https://jobs.example.com/42").unwrap()
    }

    fn job_json() -> &'static str {
        r#"{"title": "ML Engineer", "company": "X", "about": "", "description": "",
            "requirements": "", "skills": [{"name": "Python", "count": 2}], "values": []}"#
    }

    #[tokio::test]
    async fn test_no_homepage_means_no_about() {
        let fetcher = MockFetcher::new().with_page(job_url(), "job page");
        let llm = MockLlm::new().with_response("JobPostingRecord", job_url(), job_json());
        let pipeline = Pipeline::new(fetcher, llm);

        let profile = pipeline.run(&job_url(), None).await.unwrap();
        assert!(profile.about.is_none());
        assert_eq!(pipeline.client().llm().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_job_failure_is_fatal() {
        let homepage = Url::parse("https://x.com").unwrap();
        let fetcher = MockFetcher::new()
            .with_delayed_page(job_url(), "job page", Duration::from_secs(5))
            .with_page(homepage.clone(), "homepage");
        let llm = MockLlm::new().with_response("LinksResponse", homepage.clone(), r#"{"links": []}"#);
        let config = PipelineConfig::default().with_timeout(Duration::from_millis(50));
        let pipeline = Pipeline::with_config(fetcher, llm, config);

        let err = pipeline.run(&job_url(), Some(&homepage)).await.unwrap_err();
        match err {
            PipelineError::Job(failure) => assert_eq!(failure.reason(), FailureReason::Timeout),
            other => panic!("expected job failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_links_means_no_about() {
        let homepage = Url::parse("https://x.com").unwrap();
        let fetcher = MockFetcher::new()
            .with_page(job_url(), "job page")
            .with_page(homepage.clone(), "homepage");
        let llm = MockLlm::new()
            .with_response("JobPostingRecord", job_url(), job_json())
            .with_response("LinksResponse", homepage.clone(), r#"{"links": []}"#);
        let pipeline = Pipeline::new(fetcher, llm);

        let profile = pipeline.run(&job_url(), Some(&homepage)).await.unwrap();
        assert!(profile.about.is_none());
    }

    #[tokio::test]
    async fn test_cancel_aborts_run() {
        let fetcher =
            MockFetcher::new().with_delayed_page(job_url(), "job page", Duration::from_secs(30));
        let pipeline = Pipeline::new(fetcher, MockLlm::new());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline
            .run_with_cancel(&job_url(), None, cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_drops_in_flight_fetch() {
        let homepage = Url::parse("https://x.com").unwrap();
        let fetcher = MockFetcher::new()
            .with_delayed_page(job_url(), "job page", Duration::from_secs(30))
            .with_delayed_page(homepage.clone(), "homepage", Duration::from_secs(30));
        let llm = MockLlm::new().with_response("JobPostingRecord", job_url(), job_json());
        let pipeline = Pipeline::new(fetcher, llm);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = pipeline
            .run_with_cancel(&job_url(), Some(&homepage), cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(pipeline.client().fetcher().fetch_count(), 2);
        assert!(pipeline.client().llm().calls().is_empty());
    }
}
