//! Job Posting and Company Profiling Library
//!
//! Turns a job posting URL (and optionally the company homepage) into a
//! structured profile: the posting itself, plus the soft skills and company
//! values aggregated across the company's "about" pages.
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_profiler::{HttpFetcher, OpenAiCompatBackend, Pipeline, PipelineConfig, ProviderConfig};
//!
//! let llm = OpenAiCompatBackend::from_config(&ProviderConfig::from_env("gemini/gemini-2.0-flash")?)?;
//! let pipeline = Pipeline::with_config(HttpFetcher::new()?, llm, PipelineConfig::default());
//!
//! let profile = pipeline.run(&job_url, Some(&homepage)).await?;
//! println!("{}", serde_json::to_string_pretty(&profile)?);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Fetcher and LLM backend abstractions
//! - [`types`] - Records, observations and aggregated profiles
//! - [`schema`] - Extraction schemas and their validation rules
//! - [`client`] - Fetch + extract client with bounded concurrency
//! - [`pipeline`] - Job extraction, link discovery, company aggregation
//! - [`fetchers`] - HTTP and Firecrawl fetchers
//! - [`backends`] - OpenAI-compatible LLM backend
//! - [`testing`] - Mock implementations for testing

pub mod backends;
pub mod client;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod schema;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use backends::OpenAiCompatBackend;
pub use client::{Extracted, ExtractionClient, RawExtraction};
pub use config::{PipelineConfig, ProviderConfig, DEFAULT_PROVIDER};
pub use error::{ExtractionFailure, FailureReason, FetchError, LlmError, PipelineError};
pub use fetchers::{FirecrawlFetcher, HttpFetcher};
pub use pipeline::{aggregate_company_profile, discover_about_links, extract_job, Pipeline};
pub use schema::{ExtractionSchema, SchemaDescriptor};
pub use traits::{
    fetcher::{FetchConfig, FetchedPage, PageFetcher},
    llm::{DecodeParams, LlmBackend, LlmRequest},
};
pub use types::{
    company::CompanyAboutRecord,
    job::JobPostingRecord,
    link::{LinkCandidate, LinksResponse, RawLink},
    observation::{Observation, SkillObservation, ValueObservation},
    profile::{AggregatedCompanyProfile, CombinedJobProfile, PageSummary, SkippedPage},
};

// Re-export testing utilities
pub use testing::{MockFetcher, MockLlm};
