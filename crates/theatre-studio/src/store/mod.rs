//! The studio store.
//!
//! [`StudioStore`] owns the one live [`StoreState`], the undo history and the
//! optional persistent storage. It is constructed explicitly and passed by
//! reference; every write goes through a transaction.

mod editors;
mod history;
mod layout;
mod reader;
mod save_file;
mod state;
mod transaction;

use std::time::Instant;

use theatre_dataverse::{Atom, AtomId, Pointer, SubscriptionId, Value};
use theatre_persistence::{ChangeTracker, PersistedState, PersistenceError, StateStorage};

pub use editors::StateEditors;
pub use history::{History, HistoryEntry};
pub use layout::CURRENT_DEFINITION_VERSION;
pub use save_file::{
    DiskStateRevision, Keyframe, OnDiskState, SequenceState, SheetState, StaticOverrides,
    TrackData, TracksOfObject,
};
pub use state::{Drafts, Partition, StoreState};
pub use transaction::{PendingTransaction, TransactionApi};

use crate::config::StudioConfig;
use crate::error::{Result, StoreError};
use crate::ids::ProjectId;
use crate::sheet_object::{PointerRoot, StudioPointer};
use save_file::RevisionClock;

/// How [`StudioStore::initialize`] sets up the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeOptions {
    /// Names the state file among others in the same directory.
    pub persistence_key: String,
    pub use_persistent_storage: bool,
}

impl InitializeOptions {
    pub fn in_memory() -> Self {
        Self {
            persistence_key: String::new(),
            use_persistent_storage: false,
        }
    }

    pub fn persistent(persistence_key: impl Into<String>) -> Self {
        Self {
            persistence_key: persistence_key.into(),
            use_persistent_storage: true,
        }
    }
}

#[derive(Debug)]
pub struct StudioStore {
    config: StudioConfig,
    atom: Atom<StoreState>,
    history: History,
    revisions: RevisionClock,
    storage: Option<StateStorage>,
    changes: ChangeTracker,
}

impl Default for StudioStore {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl StudioStore {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            history: History::new(config.history.max_entries),
            config,
            atom: Atom::new(StoreState::default()),
            revisions: RevisionClock::default(),
            storage: None,
            changes: ChangeTracker::new(),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Restore persisted state (when asked to and a state file exists), then
    /// mark the store initialised.
    pub fn initialize(&mut self, options: &InitializeOptions) -> Result<()> {
        if options.use_persistent_storage {
            let storage = StateStorage::new(
                self.config.persistence.directory.clone(),
                options.persistence_key.as_str(),
            );
            if let Some(saved) = storage.load()? {
                self.restore(saved, &storage)?;
            }
            self.storage = Some(storage);
        }
        self.transaction(|api| api.editors(|editors| editors.set_initialised(true)))?;
        tracing::info!(
            persistent = options.use_persistent_storage,
            "studio store initialised"
        );
        Ok(())
    }

    fn restore(&mut self, saved: PersistedState, storage: &StateStorage) -> Result<()> {
        for (name, partition) in [("historic", &saved.historic), ("ahistoric", &saved.ahistoric)] {
            if !partition.is_object() {
                return Err(PersistenceError::InvalidFormat {
                    path: storage.path(),
                    reason: format!("the {name} partition is not an object"),
                }
                .into());
            }
        }
        let next = StoreState {
            historic: saved.historic,
            ahistoric: saved.ahistoric,
            ephemeral: self.atom.get().ephemeral.clone(),
        };
        self.history.clear();
        self.atom.set(next);
        tracing::info!(key = storage.key(), "restored persisted studio state");
        Ok(())
    }

    pub fn is_initialised(&self) -> bool {
        self.state().is_initialised()
    }

    pub fn state(&self) -> &StoreState {
        self.atom.get()
    }

    pub fn atom_id(&self) -> AtomId {
        self.atom.id()
    }

    /// Pointer to the whole state. Its first key selects a partition.
    pub fn pointer(&self) -> StudioPointer {
        Pointer::new(PointerRoot::Store(self.atom.id()))
    }

    pub fn read(&self, pointer: &StudioPointer) -> Result<Option<Value>> {
        reader::read_pointer(pointer, self.state(), self.atom_id())
    }

    /// Called synchronously after every committed change, undo and redo.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StoreState) + 'static,
    {
        self.atom.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.atom.unsubscribe(id)
    }

    fn apply(&mut self, next: StoreState) {
        let current = self.atom.get();
        if next.same_as(current) {
            tracing::debug!("transaction committed without changes");
            return;
        }
        let historic_changed = !Value::same_node(&current.historic, &next.historic);
        let persistent_changed =
            historic_changed || !Value::same_node(&current.ahistoric, &next.ahistoric);
        if historic_changed {
            self.history.record(&current.historic, &next.historic);
        }
        self.atom.set(next);
        if persistent_changed {
            self.changes.mark_changed(Instant::now());
        }
        tracing::debug!(
            historic_changed,
            persistent_changed,
            undo_len = self.history.undo_len(),
            "transaction committed"
        );
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Step the historic partition back. Returns `false` if there was nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.atom.get();
        let Some(previous) = self.history.undo(&current.historic) else {
            tracing::debug!("nothing to undo");
            return false;
        };
        let next = current.with_historic(previous);
        self.atom.set(next);
        self.changes.mark_changed(Instant::now());
        tracing::debug!(undo_len = self.history.undo_len(), "undo");
        true
    }

    /// Step the historic partition forward. Returns `false` if there was
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = self.atom.get();
        let Some(next_historic) = self.history.redo(&current.historic) else {
            tracing::debug!("nothing to redo");
            return false;
        };
        let next = current.with_historic(next_historic);
        self.atom.set(next);
        self.changes.mark_changed(Instant::now());
        tracing::debug!(redo_len = self.history.redo_len(), "redo");
        true
    }

    /// Replace the historic partition and forget all history. Meant for tests
    /// and bootstrapping.
    pub fn start_history_from_scratch(&mut self, historic: Value) {
        let next = self.atom.get().with_historic(historic);
        self.history.clear();
        self.atom.set(next);
        self.changes.mark_changed(Instant::now());
    }

    // =========================================================================
    // PROJECTS AND SAVE FILES
    // =========================================================================

    /// Ids of all projects in the historic partition.
    pub fn project_ids(&self) -> Vec<ProjectId> {
        self.state()
            .historic
            .get_key(layout::CORE_BY_PROJECT)
            .and_then(Value::as_object)
            .map(|projects| {
                projects
                    .keys()
                    .filter_map(|id| ProjectId::new(id.as_str()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Typed view of a project's committed state, without touching it.
    pub fn project_state(&self, project_id: &ProjectId) -> Result<Option<OnDiskState>> {
        self.state()
            .historic
            .get_path(&layout::project(project_id))
            .map(OnDiskState::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    /// Stamp a fresh revision on the project (an undoable commit) and return
    /// the project's state as a save-file snapshot.
    pub fn create_content_of_save_file(&mut self, project_id: &ProjectId) -> Result<OnDiskState> {
        if self
            .state()
            .historic
            .get_path(&layout::project(project_id))
            .is_none()
        {
            return Err(StoreError::ProjectNotFound {
                project_id: project_id.clone(),
            });
        }

        let revision = self.revisions.next();
        let max_kept = self.config.revisions.max_kept;
        self.transaction(|api| {
            api.editors(|editors| editors.add_revision(project_id, &revision, max_kept))
        })?;

        let on_disk = self
            .project_state(project_id)?
            .ok_or_else(|| StoreError::ProjectNotFound {
                project_id: project_id.clone(),
            })?;
        tracing::info!(%project_id, %revision, "created save file content");
        Ok(on_disk)
    }

    /// Install a loaded save file as a project's state (an undoable commit).
    pub fn load_project(&mut self, project_id: &ProjectId, state: &OnDiskState) -> Result<()> {
        self.transaction(|api| api.editors(|editors| editors.set_project_state(project_id, state)))?;
        tracing::info!(%project_id, "loaded project state");
        Ok(())
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Whether committed historic or ahistoric changes have not been written.
    pub fn has_unsaved_changes(&self) -> bool {
        self.changes.is_dirty()
    }

    /// Write the historic and ahistoric partitions now. Does nothing when the
    /// store was initialised without persistent storage.
    pub fn flush(&mut self) -> Result<()> {
        let Some(storage) = &self.storage else {
            tracing::debug!("no persistent storage; nothing to flush");
            return Ok(());
        };
        let state = self.atom.get();
        let mut document = PersistedState::new(state.historic.clone(), state.ahistoric.clone());

        self.changes.start_flush();
        match storage.save(&mut document) {
            Ok(()) => {
                self.changes.flush_complete();
                Ok(())
            }
            Err(err) => {
                self.changes.flush_failed();
                Err(err.into())
            }
        }
    }

    /// Flush if the configured flush policy says one is due at `now`.
    /// Returns whether a flush happened.
    pub fn flush_if_due(&mut self, now: Instant) -> Result<bool> {
        if self.storage.is_none()
            || !self
                .changes
                .should_flush(&self.config.persistence.flush, now)
        {
            return Ok(false);
        }
        if let Err(err) = self.flush() {
            tracing::warn!(error = %err, "automatic flush failed; changes stay pending");
            return Err(err);
        }
        Ok(true)
    }
}
