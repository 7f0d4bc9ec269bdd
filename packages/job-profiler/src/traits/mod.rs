//! Core trait abstractions.
//!
//! The pipeline talks to the outside world only through these traits, so
//! tests can swap in canned fetchers and backends.

pub mod fetcher;
pub mod llm;
