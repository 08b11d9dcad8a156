//! Error types for the dependency injection container.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by user factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Factory error shared between every caller coalesced onto the same build.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// A dependency edge whose target was never registered.
///
/// Produced by graph validation; identifies both the dependent entry and
/// the missing dependency name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// The entry that declared the dependency
    pub entry: String,
    /// The dependency name with no registration
    pub dependency: String,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry '{}' is missing dependency '{}'", self.entry, self.dependency)
    }
}

/// Dependency injection errors
///
/// Represents the error conditions that can occur while finalizing a
/// container or resolving a name from it.
///
/// # Examples
///
/// ```rust
/// use ferrous_wiring::{DiError, MissingDependency};
///
/// let err = DiError::MissingDependencies(vec![MissingDependency {
///     entry: "a".to_string(),
///     dependency: "b".to_string(),
/// }]);
/// assert_eq!(err.to_string(), "Entry 'a' is missing dependency 'b'");
///
/// let not_found = DiError::NotFound("db".to_string());
/// println!("Error: {}", not_found);
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Graph validation found dependencies with no registration
    #[error("{}", join_missing(.0))]
    MissingDependencies(Vec<MissingDependency>),
    /// Requested name has no entry (only with `MissingNamePolicy::Error`)
    #[error("Entry not found: {0}")]
    NotFound(String),
    /// A required module reference could not be resolved
    #[error("Module '{reference}' required by '{entry}' could not be resolved")]
    ModuleNotFound { entry: String, reference: String },
    /// The entry's factory returned an error
    #[error("Factory for '{name}' failed: {source}")]
    Factory {
        name: String,
        #[source]
        source: SharedError,
    },
    /// The entry's factory panicked
    #[error("Factory for '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
    /// A dependency's build failed, aborting the dependent's build
    #[error("Dependency '{dependency}' of '{name}' failed: {source}")]
    Dependency {
        name: String,
        dependency: String,
        #[source]
        source: Box<DiError>,
    },
    /// A resolved value was not of the requested type
    #[error("Type mismatch for '{name}': expected {expected}")]
    TypeMismatch { name: String, expected: &'static str },
    /// One or more eager entries failed (only with `EagerFailurePolicy::Abort`)
    #[error("{} eager entries failed to build: {}", .0.len(), join_eager(.0))]
    EagerInitialization(Vec<(String, DiError)>),
    /// A pending build outlived the container that started it
    #[error("Container was dropped before '{0}' finished building")]
    ContainerDropped(String),
    /// Invalid container configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiError {
    /// Walks `Dependency` wrappers down to the error that started the failure.
    pub fn root_cause(&self) -> &DiError {
        match self {
            DiError::Dependency { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn join_missing(missing: &[MissingDependency]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_eager(failures: &[(String, DiError)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("'{}': {}", name, err))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
