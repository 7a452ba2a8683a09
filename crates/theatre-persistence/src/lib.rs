//! Persistent storage for the Theatre Studio store.
//!
//! The studio keeps two of its three state partitions across sessions: the
//! undo-tracked `historic` partition and the `ahistoric` partition (UI state
//! that outlives a session but is not part of history). The `ephemeral`
//! partition and the undo/redo stacks are never written.
//!
//! # Features
//!
//! - **Atomic writes** (temp file + fsync + rename) so a crash never leaves a
//!   half-written state file
//! - **Format and schema checks** on load
//! - **Debounced flushing** via [`FlushPolicy`] and [`ChangeTracker`]
//!
//! # File Format
//!
//! State files are JSON documents:
//!
//! ```text
//! {
//!   "format": "theatre-studio-state",
//!   "schemaVersion": 1,
//!   "savedAt": "2024-05-01T10:00:00+00:00",
//!   "historic": { ... },
//!   "ahistoric": { ... }
//! }
//! ```
//!
//! # Architecture
//!
//! - `types.rs` - the persisted document
//! - `io/` - atomic save and validating load
//! - `storage.rs` - persistence key to file mapping
//! - `flush/` - when to write (policy and change tracking)
//! - `error.rs` - error types with user-facing messages

mod error;
mod flush;
mod io;
mod storage;
mod types;

pub use error::{PersistenceError, Result};
pub use flush::{ChangeTracker, FlushPolicy};
pub use io::{load_state, save_state, write_atomic};
pub use storage::StateStorage;
pub use types::{CURRENT_SCHEMA_VERSION, FORMAT_MARKER, PersistedState};
