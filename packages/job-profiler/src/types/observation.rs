//! Skill and value observations.
//!
//! An observation is a `(name, count)` pair reported by one extraction call.
//! Skills and values share the shape but live on different axes, so they are
//! distinct types tied together by the [`Observation`] trait.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Common behaviour of skill and value observations.
pub trait Observation: Clone {
    /// Display name as reported.
    fn name(&self) -> &str;

    /// Number of mentions, always at least 1 once validated.
    fn count(&self) -> u32;

    /// Build an observation from merged parts.
    fn from_parts(name: String, count: u32) -> Self;
}

/// A skill mentioned on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SkillObservation {
    /// The name of the skill
    pub name: String,

    /// The number of times this skill is referenced
    #[schemars(range(min = 1))]
    pub count: u32,
}

impl SkillObservation {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl Observation for SkillObservation {
    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn from_parts(name: String, count: u32) -> Self {
        Self { name, count }
    }
}

/// A company value mentioned on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ValueObservation {
    /// The name of the company value
    pub name: String,

    /// The number of times this value is referenced
    #[schemars(range(min = 1))]
    pub count: u32,
}

impl ValueObservation {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl Observation for ValueObservation {
    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn from_parts(name: String, count: u32) -> Self {
        Self { name, count }
    }
}

/// Check that every observation has a name and a positive count.
pub(crate) fn validate_observations<O: Observation>(
    field: &str,
    observations: &[O],
) -> Result<(), String> {
    for (i, obs) in observations.iter().enumerate() {
        if obs.name().trim().is_empty() {
            return Err(format!("{field}[{i}] has an empty name"));
        }
        if obs.count() == 0 {
            return Err(format!("{field}[{i}] ({}) has count 0", obs.name().trim()));
        }
    }
    Ok(())
}
