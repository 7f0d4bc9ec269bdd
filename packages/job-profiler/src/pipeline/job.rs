//! Job posting extraction.

use tracing::info;
use url::Url;

use super::prompts::JOB_POSTING_PROMPT;
use crate::client::ExtractionClient;
use crate::error::ExtractionResult;
use crate::traits::{fetcher::PageFetcher, llm::{DecodeParams, LlmBackend}};
use crate::types::job::JobPostingRecord;

/// Extract the job posting at `job_url`.
///
/// Any failure is returned to the caller; the pipeline treats it as fatal.
pub async fn extract_job<F: PageFetcher, L: LlmBackend>(
    client: &ExtractionClient<F, L>,
    job_url: &Url,
) -> ExtractionResult<JobPostingRecord> {
    let extracted = client
        .extract_one::<JobPostingRecord>(job_url, JOB_POSTING_PROMPT, DecodeParams::content())
        .await?;

    let job = extracted.record;
    info!(
        url = %job_url,
        title = %job.title,
        company = %job.company,
        skills = job.skills.len(),
        values = job.values.len(),
        "Extracted job posting"
    );

    Ok(job)
}
