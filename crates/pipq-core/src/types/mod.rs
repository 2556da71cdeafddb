//! Core data types for version and dependency handling.

pub mod marker;
pub mod requirement;
pub mod version;

pub use marker::{DependencyEvaluator, MarkerEnvironment};
pub use requirement::{MarkerClause, MarkerGroup, MarkerOp, Requirement};
pub use version::{
    AnyVersion, Constraint, ConstraintOp, LegacyVersion, LocalSegment, PreTag, Version,
};
