//! Company aggregation: extract every about page and merge the results.

use indexmap::{IndexMap, IndexSet};
use tracing::{info, warn};
use url::Url;

use super::merge::ObservationTally;
use super::prompts::format_company_prompt;
use crate::client::{ExtractionClient, Extracted};
use crate::traits::{fetcher::PageFetcher, llm::{DecodeParams, LlmBackend}};
use crate::types::{
    company::CompanyAboutRecord,
    link::LinkCandidate,
    profile::{AggregatedCompanyProfile, PageSummary, SkippedPage},
};

/// Extract a company record from every link and fold them into one profile.
///
/// Links sharing a URL are fetched once. Failed links are recorded in
/// `skipped` and otherwise ignored, so the result is never an error; when
/// every link fails the profile is empty.
pub async fn aggregate_company_profile<F: PageFetcher, L: LlmBackend>(
    client: &ExtractionClient<F, L>,
    links: &IndexSet<LinkCandidate>,
    job_title_hint: Option<&str>,
) -> AggregatedCompanyProfile {
    // First label wins for a URL; it is the last-resort page title.
    let mut targets: IndexMap<Url, &str> = IndexMap::new();
    for link in links {
        targets.entry(link.url.clone()).or_insert(link.label.as_str());
    }

    if targets.is_empty() {
        return AggregatedCompanyProfile::empty();
    }

    let urls: Vec<Url> = targets.keys().cloned().collect();
    let instruction =
        format_company_prompt(job_title_hint, client.config().output_language.as_deref());

    info!(pages = urls.len(), "Extracting company pages");

    let results = client
        .extract_records::<CompanyAboutRecord>(&urls, &instruction, DecodeParams::content())
        .await;

    let mut profile = AggregatedCompanyProfile::empty();
    profile.pages_attempted = urls.len();

    let mut skills = ObservationTally::new();
    let mut values = ObservationTally::new();

    for result in results {
        match result {
            Ok(extracted) => {
                let label = targets.get(&extracted.url).copied().unwrap_or_default();
                skills.extend(&extracted.record.soft_skills);
                values.extend(&extracted.record.values);
                profile.pages.push(summarize(extracted, label));
            }
            Err(e) => {
                warn!(url = %e.url(), reason = %e.reason(), "Skipping company page");
                profile.skipped.push(SkippedPage {
                    url: e.url().clone(),
                    reason: e.reason(),
                });
            }
        }
    }

    profile.soft_skills = skills.into_sorted();
    profile.values = values.into_sorted();

    let (extracted, attempted) = profile.coverage();
    info!(
        extracted,
        attempted,
        soft_skills = profile.soft_skills.len(),
        values = profile.values.len(),
        "Aggregated company profile"
    );

    profile
}

fn summarize(extracted: Extracted<CompanyAboutRecord>, label: &str) -> PageSummary {
    let Extracted {
        url,
        record,
        page_title: fetched_title,
    } = extracted;

    let page_title = [Some(record.page_title.as_str()), fetched_title.as_deref(), Some(label)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string();

    PageSummary {
        page_title,
        about_text: record.about_text.trim().to_string(),
        url,
    }
}
