//! Persistence error types.
//!
//! Every variant carries enough context for a user-facing message and an
//! optional hint on how to recover.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a studio state file.
    #[error("Invalid studio state file {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// The file was written by a newer schema.
    #[error("Studio state version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    #[error("Failed to serialize studio state")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to deserialize studio state from {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The temp file was written but could not replace the target.
    #[error("Failed to complete write of {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the error only means "nothing has been saved yet".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// A message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} {}", operation, path.display()),
            Self::InvalidFormat { path, reason } => format!(
                "{} is not a Theatre Studio state file: {}",
                path.display(),
                reason
            ),
            Self::UnsupportedVersion {
                found,
                max_supported,
                ..
            } => format!(
                "The saved studio state was written by a newer version \
                 (state version {found}, this build supports up to {max_supported})."
            ),
            Self::Serialization { .. } => {
                "An error occurred while saving the studio state.".to_string()
            }
            Self::Deserialization { path, .. } => format!(
                "The studio state at {} could not be read. The file may be corrupted.",
                path.display()
            ),
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not write {}. Please check disk space and permissions.",
                target_path.display()
            ),
        }
    }

    /// A hint on how to resolve the error, when there is one.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Io { operation, .. } if *operation == "read" => {
                Some("Check that the file exists and is readable.")
            }
            Self::Io { .. } => Some("Check that the state directory is writable."),
            Self::InvalidFormat { .. } => {
                Some("Point the studio at a different state directory or persistence key.")
            }
            Self::UnsupportedVersion { .. } => Some("Update Theatre Studio."),
            Self::Serialization { .. } => None,
            Self::Deserialization { .. } => {
                Some("Move the file aside to start from an empty studio state.")
            }
            Self::AtomicWriteFailed { .. } => Some("Free up disk space or choose another directory."),
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_recognised() {
        let err = PersistenceError::io(
            "read",
            "/tmp/missing.json",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.is_not_found());
        assert_eq!(err.suggestion(), Some("Check that the file exists and is readable."));
        assert!(err.user_message().contains("missing.json"));
    }

    #[test]
    fn version_message_names_both_versions() {
        let err = PersistenceError::UnsupportedVersion {
            found: 7,
            max_supported: 1,
            path: PathBuf::from("state.json"),
        };
        let message = err.user_message();
        assert!(message.contains('7'));
        assert!(message.contains('1'));
        assert!(!err.is_not_found());
    }
}
