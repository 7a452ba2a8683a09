//! Mapping from a persistence key to a state file.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io::{load_state, save_state};
use crate::types::PersistedState;

/// File-backed storage for one persistence key.
///
/// Several studios can share a directory as long as their keys differ.
#[derive(Debug, Clone)]
pub struct StateStorage {
    directory: PathBuf,
    key: String,
}

impl StateStorage {
    pub fn new(directory: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the state file. Characters outside `[A-Za-z0-9._-]` in the
    /// key are replaced with `_`.
    pub fn path(&self) -> PathBuf {
        let mut name: String = self
            .key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.is_empty() || name.starts_with('.') {
            name.insert(0, '_');
        }
        name.push_str(".json");
        self.directory.join(name)
    }

    /// Load the saved state, or `None` if nothing has been saved under this
    /// key yet.
    pub fn load(&self) -> Result<Option<PersistedState>> {
        match load_state(&self.path()) {
            Ok(state) => Ok(Some(state)),
            Err(err) if err.is_not_found() => {
                tracing::debug!(key = %self.key, "no saved studio state");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn save(&self, state: &mut PersistedState) -> Result<()> {
        save_state(state, &self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use theatre_dataverse::Value;

    #[test]
    fn keys_are_sanitised_into_file_names() {
        let storage = StateStorage::new("/state", "my project/v2");
        assert_eq!(storage.path(), PathBuf::from("/state/my_project_v2.json"));
        assert_eq!(
            StateStorage::new("/state", "..").path(),
            PathBuf::from("/state/_...json")
        );
        assert_eq!(
            StateStorage::new("/state", "").path(),
            PathBuf::from("/state/_.json")
        );
    }

    #[test]
    fn load_before_first_save_is_none() {
        let dir = tempdir().unwrap();
        let storage = StateStorage::new(dir.path(), "studio");
        assert!(storage.load().unwrap().is_none());

        let mut state = PersistedState::new(Value::object(), Value::from_entries([("x", 1)]));
        storage.save(&mut state).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.ahistoric, Value::from_entries([("x", 1)]));
    }

    #[test]
    fn distinct_keys_do_not_collide() {
        let dir = tempdir().unwrap();
        let a = StateStorage::new(dir.path(), "a");
        let b = StateStorage::new(dir.path(), "b");
        a.save(&mut PersistedState::new(Value::from_entries([("who", "a")]), Value::object()))
            .unwrap();
        assert!(b.load().unwrap().is_none());
        assert!(a.load().unwrap().is_some());
    }
}
