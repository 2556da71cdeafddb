//! Error types and result aliases for pipq operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the pipq ecosystem with actionable error messages.

use thiserror::Error;

/// Unified error type for all pipq operations
#[derive(Error, Debug)]
pub enum PipqError {
    // Requirement parsing errors
    #[error("Requirement line has no parseable package name: '{line}'")]
    MalformedRequirement { line: String },

    #[error("Invalid version constraint clause: '{clause}'")]
    InvalidConstraint { clause: String },

    // Version comparison errors
    #[error("Cannot match '{left}' against '{right}': legacy-form versions are not ordered against structured versions")]
    IncompatibleVersionComparison { left: String, right: String },

    #[error("'{text}' does not conform to the structured version grammar")]
    InvalidVersion { text: String },

    // Marker evaluation errors
    #[error("Marker key '{key}' only supports equality checks, got '{op}'")]
    UnknownMarkerOperator { key: String, op: String },

    #[error("Unknown environment marker key '{key}'")]
    UnknownMarkerKey { key: String },

    // Dependency tree errors
    #[error("'{property}' is not available until the dependency node is populated")]
    NotPopulated { property: &'static str },

    // CLI input errors
    #[error("Invalid date '{text}', expected YYYY-MM-DD")]
    InvalidDate { text: String },

    // Registry errors
    #[error("Package '{name}' not found in the package index")]
    PackageNotFound { name: String },

    #[error("Version {release} not found for package '{name}' in the package index")]
    VersionNotFound { name: String, release: String },

    #[error("The package index is temporarily unavailable")]
    ServiceUnavailable,

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to decode index response: {message}")]
    Json { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pipq operations
pub type PipqResult<T> = Result<T, PipqError>;

impl PipqError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipqError::Network { .. } | PipqError::ServiceUnavailable | PipqError::Io { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PipqError::PackageNotFound { .. } => {
                Some("Check the package name spelling or search the index directly")
            },
            PipqError::VersionNotFound { .. } => {
                Some("Run the 'releases' subcommand to list the versions that exist")
            },
            PipqError::Network { .. } => Some("Check your internet connection and try again"),
            PipqError::ServiceUnavailable => {
                Some("The index is having a bad moment; retry in a few minutes")
            },
            PipqError::NotPopulated { .. } => {
                Some("Call populate() on the dependency node before reading resolved fields")
            },
            _ => None,
        }
    }
}
