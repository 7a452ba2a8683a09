//! Saving studio state.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::types::PersistedState;

/// Save studio state to `path`, stamping the save time first.
pub fn save_state(state: &mut PersistedState, path: &Path) -> Result<()> {
    state.touch();
    let bytes = serde_json::to_vec_pretty(state)
        .map_err(|source| PersistenceError::Serialization { source })?;
    write_atomic(path, &bytes)?;
    tracing::info!("Saved studio state to {}", path.display());
    Ok(())
}

/// Write `bytes` to `path` through a sibling temp file and a rename.
///
/// Readers see either the old contents or the new ones, never a prefix.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PersistenceError::io("create directory", parent, e))?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file =
        File::create(&temp_path).map_err(|e| PersistenceError::io("create", &temp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| PersistenceError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| PersistenceError::io("sync", &temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|source| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(bytes = bytes.len(), "wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use theatre_dataverse::Value;

    #[test]
    fn save_writes_marker_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("studio.json");

        let mut state = PersistedState::new(Value::object(), Value::object());
        save_state(&mut state, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"format\": \"theatre-studio-state\""));
        assert!(!dir.path().join("nested").join("studio.json.tmp").exists());
    }

    #[test]
    fn write_atomic_replaces_existing_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }
}
