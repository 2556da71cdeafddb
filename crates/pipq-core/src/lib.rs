//! # pipq-core
//!
//! Core types and algorithms shared across all pipq crates.
//!
//! This crate provides:
//! - Version parsing with a total order, legacy fallback and constraint
//!   matching
//! - Requirement parsing (name, extras, constraints, environment markers)
//! - MarkerEnvironment and the evaluator that decides which dependencies
//!   apply
//! - PipqError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Requirement, MarkerEnvironment, ...)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{PipqError, PipqResult};
pub use types::{
    AnyVersion, Constraint, ConstraintOp, DependencyEvaluator, LegacyVersion, MarkerClause,
    MarkerEnvironment, MarkerGroup, MarkerOp, Requirement, Version,
};
