//! Dependency tree resolution for pipq
//!
//! This crate turns parsed requirements into a lazily-populated dependency
//! tree, resolving each node against the package index and filtering
//! children through the environment-marker evaluator.

pub mod select;
pub mod tree;

// Re-export main types
pub use select::ReleaseSelector;
pub use tree::{DependencyNode, PackageFetcher, ResolvedRelease};

use pipq_core::error::PipqError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, PipqError>;
