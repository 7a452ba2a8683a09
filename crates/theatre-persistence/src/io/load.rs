//! Loading studio state.

use std::fs;
use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::types::{CURRENT_SCHEMA_VERSION, FORMAT_MARKER, PersistedState};

/// Load studio state from `path`.
pub fn load_state(path: &Path) -> Result<PersistedState> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::io("read", path, e))?;
    parse_state_bytes(&bytes, path)
}

/// Check the header fields before decoding the whole document, so a foreign
/// or future file is reported as such rather than as a decode failure.
fn parse_state_bytes(bytes: &[u8], path: &Path) -> Result<PersistedState> {
    let document: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|source| PersistenceError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;

    let format = document.get("format").and_then(serde_json::Value::as_str);
    if format != Some(FORMAT_MARKER) {
        return Err(PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("expected format \"{FORMAT_MARKER}\", found {format:?}"),
        });
    }

    let version = document
        .get("schemaVersion")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "missing schemaVersion".to_string(),
        })?;
    let version = u32::try_from(version).unwrap_or(u32::MAX);
    if version > CURRENT_SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: version,
            max_supported: CURRENT_SCHEMA_VERSION,
            path: path.to_path_buf(),
        });
    }

    let state: PersistedState =
        serde_json::from_value(document).map_err(|source| PersistenceError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!("Loaded studio state from {}", path.display());
    Ok(state)
}
