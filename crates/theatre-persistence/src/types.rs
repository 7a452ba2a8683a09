//! The persisted studio document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use theatre_dataverse::Value;

/// Current schema version.
///
/// The loader rejects files with a higher version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Value of the `format` field of every state file.
pub const FORMAT_MARKER: &str = "theatre-studio-state";

/// Persistent partitions of the studio store, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub format: String,
    pub schema_version: u32,
    /// RFC 3339 timestamp of the last save.
    pub saved_at: String,
    pub historic: Value,
    pub ahistoric: Value,
}

impl PersistedState {
    pub fn new(historic: Value, ahistoric: Value) -> Self {
        Self {
            format: FORMAT_MARKER.to_string(),
            schema_version: CURRENT_SCHEMA_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            historic,
            ahistoric,
        }
    }

    /// Update the saved timestamp.
    pub fn touch(&mut self) {
        self.saved_at = Utc::now().to_rfc3339();
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.saved_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
