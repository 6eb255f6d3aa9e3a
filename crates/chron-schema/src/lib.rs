//! # chron-schema
//!
//! JSON Schema generation, validation, and registry for Chronicle.
//!
//! Artefact and model-output types are defined in `chron-core` with
//! `#[derive(JsonSchema)]`. This crate builds the schemas once and validates
//! untrusted JSON (language-model output) and outgoing artefacts against them.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
