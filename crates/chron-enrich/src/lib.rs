//! # chron-enrich
//!
//! The Chronicle enrichment pipeline: multi-part arc detection, seed
//! building, cache and legacy promotion, year/scope resolution, key and
//! umbrella aggregation, and artefact output.
//!
//! The entry points are [`pipeline::run`] for a full read-enrich-write pass
//! and [`pipeline::enrich`] for the in-memory part.

pub mod artefacts;
pub mod cache;
pub mod century;
pub mod detect;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod resolve;
pub mod seeds;
pub mod umbrella;

#[cfg(test)]
mod test_support;

pub use error::EnrichError;
pub use pipeline::{RunInputs, RunOptions, RunOutput, RunSummary, enrich, run};
