//! Error types for the studio store.

use std::path::PathBuf;

use theatre_dataverse::{DataverseError, DraftError};
use theatre_persistence::PersistenceError;
use thiserror::Error;

use crate::ids::{ProjectId, SequenceTrackId};

/// Errors raised by the studio store and its transaction API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    // =========================================================================
    // TRANSACTION ERRORS
    // =========================================================================
    /// `set`/`unset` aimed at something other than a sheet object's props.
    #[error("only props of sheet objects can be set in a transaction, not `{pointer}`")]
    InvalidTarget { pointer: String },

    /// A transaction API handle was used after its transaction returned.
    #[error("the transaction API was used after the transaction finished running")]
    TransactionFinished,

    /// The drafts were accessed from inside a `with_drafts`/`editors` callback.
    #[error("the transaction drafts are already borrowed")]
    DraftsBusy,

    /// The value does not fit the object's template.
    #[error("invalid value for `{path}`: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("sequence track {track_id} does not exist")]
    TrackNotFound { track_id: SequenceTrackId },

    // =========================================================================
    // EXPORT ERRORS
    // =========================================================================
    #[error("project {project_id} has not been initialized")]
    ProjectNotFound { project_id: ProjectId },

    // =========================================================================
    // WRAPPED ERRORS
    // =========================================================================
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Dataverse(#[from] DataverseError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors in ids and typed state documents.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{kind} must not be empty")]
    EmptyId { kind: &'static str },

    #[error("invalid {what} document")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {what}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors loading or saving [`StudioConfig`](crate::StudioConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config{}", location(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
