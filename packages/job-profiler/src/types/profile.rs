//! Aggregated outputs: the company profile and the combined pipeline result.

use serde::{Deserialize, Serialize};
use url::Url;

use super::job::JobPostingRecord;
use super::observation::{SkillObservation, ValueObservation};
use crate::error::FailureReason;

/// Summary of one successfully extracted "about" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub page_title: String,
    pub about_text: String,
    pub url: Url,
}

/// A link that produced no record, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    pub url: Url,
    pub reason: FailureReason,
}

/// Company profile folded from every successfully extracted "about" page.
///
/// Never built from LLM output directly; see
/// [`aggregate_company_profile`](crate::pipeline::company::aggregate_company_profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedCompanyProfile {
    /// Page summaries in extraction order
    pub pages: Vec<PageSummary>,

    /// Merged soft skills, ascending by count
    pub soft_skills: Vec<SkillObservation>,

    /// Merged company values, ascending by count
    pub values: Vec<ValueObservation>,

    /// Number of distinct pages an extraction was attempted on
    pub pages_attempted: usize,

    /// Pages that failed, in input order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedPage>,
}

impl AggregatedCompanyProfile {
    /// Profile for a batch where nothing was attempted.
    pub fn empty() -> Self {
        Self {
            pages: Vec::new(),
            soft_skills: Vec::new(),
            values: Vec::new(),
            pages_attempted: 0,
            skipped: Vec::new(),
        }
    }

    /// True when no page was extracted.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// `(extracted, attempted)`, the "N of M pages" completeness pair.
    pub fn coverage(&self) -> (usize, usize) {
        (self.pages.len(), self.pages_attempted)
    }
}

/// Final pipeline output.
///
/// `about` is present only when a homepage was supplied and at least one
/// company page was extracted; it is omitted from JSON otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedJobProfile {
    pub job_posting: JobPostingRecord,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<AggregatedCompanyProfile>,
}
