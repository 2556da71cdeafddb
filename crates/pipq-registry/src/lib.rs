//! Package index client for pipq
//!
//! This crate provides HTTP client functionality for fetching package
//! metadata from the PyPI JSON API with connection pooling, retry logic,
//! and in-memory caching.

pub mod api;
pub mod cache;
pub mod client;

// Re-export main types
pub use api::{Digests, PackageInfo, PackageResponse, ReleaseFile, Vulnerability};
pub use cache::{CacheEntry, CacheStats, MetadataCache};
pub use client::{RegistryClient, RetryConfig};

use pipq_core::error::PipqError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, PipqError>;
