//! Job posting record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::observation::{SkillObservation, ValueObservation};

/// Normalized job posting extracted from one job URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobPostingRecord {
    /// Name of the title of the job position
    pub title: String,

    /// Name of the company posting the job position
    pub company: String,

    /// Information about the company posting the job position
    pub about: String,

    /// Description of the job position
    pub description: String,

    /// Requirements and qualifications for the job position
    pub requirements: String,

    /// List of hard and soft skills mentioned in the job position
    pub skills: Vec<SkillObservation>,

    /// List of company values mentioned in the job position
    pub values: Vec<ValueObservation>,
}
