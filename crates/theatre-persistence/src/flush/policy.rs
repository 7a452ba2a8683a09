//! Flush timing settings.

use serde::{Deserialize, Serialize};

/// When committed state is written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlushPolicy {
    pub enabled: bool,

    /// Quiet period after the latest commit before a flush is due.
    pub debounce_ms: u64,

    /// Upper bound on how long the oldest unsaved commit may wait, even
    /// while commits keep arriving.
    pub max_delay_ms: u64,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl FlushPolicy {
    /// A policy that never flushes on its own. Explicit flushes still work.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn should_flush(&self, since_last_change_ms: u64, since_first_unsaved_ms: u64) -> bool {
        self.enabled
            && (since_last_change_ms >= self.debounce_ms
                || since_first_unsaved_ms >= self.max_delay_ms)
    }
}
