//! # chron-core
//!
//! Core types, enums, and error types for Chronicle.
//!
//! This crate provides the foundational types shared across all Chronicle crates:
//! - Input and output entities (episodes, series, collections, umbrellas)
//! - The persisted inference cache shapes (current and legacy)
//! - The structured judgement returned by the language model
//! - Scope / provenance enums
//! - Kebab-case key helpers
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod text;
