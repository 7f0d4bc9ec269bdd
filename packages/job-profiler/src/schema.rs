//! Schema registry.
//!
//! Every record the LLM is asked to produce implements [`ExtractionSchema`]:
//! its JSON schema comes from `schemars` (via [`StructuredOutput`]) and its
//! semantic rules from [`ExtractionSchema::validate`].

use llm_client::StructuredOutput;
use serde_json::Value;

use crate::types::{
    company::CompanyAboutRecord,
    job::JobPostingRecord,
    link::LinksResponse,
    observation::validate_observations,
};

/// Name and JSON schema handed to the LLM backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub name: String,
    pub json_schema: Value,
}

impl SchemaDescriptor {
    /// Descriptor for a record type.
    pub fn of<T: ExtractionSchema>() -> Self {
        Self {
            name: T::type_name(),
            json_schema: T::strict_schema(),
        }
    }
}

/// A record type the pipeline can request from the LLM.
pub trait ExtractionSchema: StructuredOutput + Send + 'static {
    /// Semantic checks beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String>;

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor::of::<Self>()
    }
}

impl ExtractionSchema for JobPostingRecord {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("job posting has no title".to_string());
        }
        validate_observations("skills", &self.skills)?;
        validate_observations("values", &self.values)
    }
}

impl ExtractionSchema for CompanyAboutRecord {
    fn validate(&self) -> Result<(), String> {
        if self.is_blank() {
            return Err("company page has no about text and no observations".to_string());
        }
        validate_observations("soft_skills", &self.soft_skills)?;
        validate_observations("values", &self.values)
    }
}

impl ExtractionSchema for LinksResponse {
    // Individual links are checked during discovery so one bad URL does not
    // sink the whole list.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
