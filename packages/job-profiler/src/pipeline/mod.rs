//! Pipeline stages: job extraction, link discovery, company aggregation.

pub mod company;
pub mod discovery;
pub mod job;
pub mod merge;
pub mod orchestrator;
pub mod prompts;

pub use company::aggregate_company_profile;
pub use discovery::discover_about_links;
pub use job::extract_job;
pub use merge::{merge_observations, ObservationTally};
pub use orchestrator::Pipeline;
