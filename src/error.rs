//! Error types for muck
//!
//! All modules use `MuckResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for muck operations
pub type MuckResult<T> = Result<T, MuckError>;

/// Boxed transport error kept behind a flattened fetch failure
pub type TransportSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    /// DNS, connection, timeout, TLS or any other transport-level failure
    Transport,
    /// The server answered with a status other than the expected one
    Status(u16),
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Status(code) => write!(f, "status {}", code),
        }
    }
}

/// All errors that can occur in muck
#[derive(Error, Debug)]
pub enum MuckError {
    // Argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Loader registry errors
    #[error("Loader already registered for extension {ext:?}")]
    DuplicateRegistration { ext: String },

    #[error("No loader found for target {path:?} (extension: {ext:?})")]
    NoLoaderFound { path: String, ext: String },

    #[error("Loader {loader:?} rejected option {key:?}: {reason}")]
    ParserOption {
        loader: String,
        key: String,
        reason: String,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    // Dependency errors
    #[error("{}", dependency_not_found_message(.path, .target))]
    DependencyNotFound { path: String, target: String },

    // Fetch errors
    #[error("{detail}")]
    FetchFailed {
        kind: FetchFailureKind,
        detail: String,
        #[source]
        source: Option<TransportSource>,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn dependency_not_found_message(path: &str, target: &str) -> String {
    if path == target {
        format!("Cannot open dependency: {}", path)
    } else {
        format!(
            "Cannot open dependency: {} (nor does a file exist at source path: {})",
            path, target
        )
    }
}

impl MuckError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a fetch failure for a transport-level error.
    ///
    /// The message carries only the error kind name and its rendered
    /// arguments; the original error stays reachable through `source()`.
    pub fn transport(kind_name: &str, source: TransportSource) -> Self {
        Self::FetchFailed {
            kind: FetchFailureKind::Transport,
            detail: format!("fetch failed with exception: {}: {}", kind_name, source),
            source: Some(source),
        }
    }

    /// Create a fetch failure for an unexpected status code
    pub fn bad_status(code: u16, detail: String) -> Self {
        Self::FetchFailed {
            kind: FetchFailureKind::Status(code),
            detail,
            source: None,
        }
    }

    /// Whether this error is a fetch failure
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DependencyNotFound { .. } => {
                Some("Check that the source file is checked in, or that the product has been built")
            }
            Self::NoLoaderFound { .. } => {
                Some("Pass an explicit extension, or register a loader for it first")
            }
            Self::DuplicateRegistration { .. } => {
                Some("Only built-in extensions may be registered more than once")
            }
            Self::FetchFailed {
                kind: FetchFailureKind::Transport,
                ..
            } => Some("Check the network connection and the URL"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_not_found_names_both_paths() {
        let err = MuckError::DependencyNotFound {
            path: "_build/data/x.csv".to_string(),
            target: "data/x.csv".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("_build/data/x.csv"));
        assert!(msg.contains("source path: data/x.csv"));
    }

    #[test]
    fn dependency_not_found_same_path_mentioned_once() {
        let err = MuckError::DependencyNotFound {
            path: "_fetch/a".to_string(),
            target: "_fetch/a".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot open dependency: _fetch/a");
    }

    #[test]
    fn no_loader_names_path_and_ext() {
        let err = MuckError::NoLoaderFound {
            path: "x.bin".to_string(),
            ext: ".bin".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("x.bin"));
        assert!(msg.contains(".bin"));
    }

    #[test]
    fn transport_failure_is_flat_but_chained() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = MuckError::transport("ConnectionFailed", Box::new(io));
        assert_eq!(
            err.to_string(),
            "fetch failed with exception: ConnectionFailed: refused"
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn error_hint() {
        let err = MuckError::DuplicateRegistration {
            ext: ".yaml".to_string(),
        };
        assert!(err.hint().is_some());
        assert_eq!(MuckError::invalid("x").hint(), None);
    }
}
