//! Company "about" page record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::observation::{SkillObservation, ValueObservation};

/// Company profile extracted from a single "about" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyAboutRecord {
    /// Title of the page the information was taken from
    pub page_title: String,

    /// Text describing what the company is about
    pub about_text: String,

    /// List of soft skills mentioned in the web page
    pub soft_skills: Vec<SkillObservation>,

    /// List of company values mentioned in the web page
    pub values: Vec<ValueObservation>,
}

impl CompanyAboutRecord {
    /// A record with no text and no observations carries nothing to merge.
    pub fn is_blank(&self) -> bool {
        self.about_text.trim().is_empty() && self.soft_skills.is_empty() && self.values.is_empty()
    }
}
