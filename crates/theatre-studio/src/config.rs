//! Studio store configuration.
//!
//! Loaded from TOML. Every section and field is optional; missing values take
//! their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use theatre_persistence::FlushPolicy;

use crate::error::ConfigError;

// =============================================================================
// ROOT CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub history: HistoryConfig,
    pub revisions: RevisionConfig,
    pub persistence: PersistenceConfig,
}

impl StudioConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("studio.toml"))
            .unwrap_or_else(|| PathBuf::from("studio.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "Theatre", "Theatre Studio")
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest undo steps are dropped beyond this many.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 200 }
    }
}

/// Save-file revision settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionConfig {
    /// Length of each project's `revisionHistory`.
    pub max_kept: usize,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self { max_kept: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Directory holding one state file per persistence key.
    pub directory: PathBuf,
    pub flush: FlushPolicy,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            directory: project_dirs()
                .map(|dirs| dirs.data_dir().join("state"))
                .unwrap_or_else(|| PathBuf::from(".theatre-studio")),
            flush: FlushPolicy::default(),
        }
    }
}
