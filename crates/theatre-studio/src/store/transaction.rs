//! Transactions over the three state partitions.
//!
//! A transaction runs in two phases:
//!
//! 1. **Open**: [`StudioStore::temp_transaction`] opens one draft per
//!    partition and runs the caller's closure with a [`TransactionApi`]. If
//!    the closure fails, the drafts are dropped and its error is returned
//!    unchanged.
//! 2. **Pending**: on success the drafts are frozen into a
//!    [`PendingTransaction`], which is either committed or discarded. Both
//!    consume it, so it can be settled only once.

use std::cell::RefCell;
use std::rc::Rc;

use theatre_dataverse::path::try_for_each_leaf;
use theatre_dataverse::{AtomId, Value, display_path};

use super::StudioStore;
use super::editors::StateEditors;
use super::reader::read_pointer;
use super::state::{Drafts, StoreState};
use crate::error::{Result, StoreError};
use crate::sheet_object::{PointerRoot, SheetObject, StudioPointer};

/// Mutation API handed to a transaction's closure.
///
/// Cheap to clone. Every clone stops working once the closure returns.
#[derive(Debug, Clone)]
pub struct TransactionApi {
    drafts: Rc<RefCell<Option<Drafts>>>,
    store: AtomId,
}

impl TransactionApi {
    fn open(state: &StoreState, store: AtomId) -> Self {
        Self {
            drafts: Rc::new(RefCell::new(Some(Drafts::open(state)))),
            store,
        }
    }

    /// Take the drafts back. Later calls through any clone fail with
    /// [`StoreError::TransactionFinished`].
    fn close(&self) -> Result<Drafts> {
        self.drafts
            .try_borrow_mut()
            .map_err(|_| StoreError::DraftsBusy)?
            .take()
            .ok_or(StoreError::TransactionFinished)
    }

    /// Whether the owning transaction is still running.
    pub fn is_open(&self) -> bool {
        self.drafts.try_borrow().map_or(true, |drafts| drafts.is_some())
    }

    fn with_open<T>(&self, f: impl FnOnce(&mut Drafts) -> T) -> Result<T> {
        let mut guard = self
            .drafts
            .try_borrow_mut()
            .map_err(|_| StoreError::DraftsBusy)?;
        let drafts = guard.as_mut().ok_or(StoreError::TransactionFinished)?;
        Ok(f(drafts))
    }

    fn ensure_open(&self) -> Result<()> {
        self.with_open(|_| ())
    }

    /// Set the props at `pointer` to `value`.
    ///
    /// Every non-null leaf of `value` is written separately: as a keyframe at
    /// the playhead (snapped to the grid first) if the prop is sequenced, as
    /// a static override otherwise.
    pub fn set(&self, pointer: &StudioPointer, value: impl Into<Value>) -> Result<()> {
        self.ensure_open()?;
        let value = value.into();
        let object = sheet_object_root(pointer)?;
        object.template().validate_value(pointer.path(), &value)?;

        let address = object.address();
        let sequence = object.sequence();
        self.with_open(|drafts| {
            let mut editors = StateEditors::new(drafts);
            let mut project_ready = false;
            try_for_each_leaf(&value, pointer.path(), |leaf, prop| {
                if leaf.is_null() {
                    return Ok(());
                }
                if !project_ready {
                    editors.ensure_project(&address.project_id)?;
                    project_ready = true;
                }
                match editors.track_id_for_prop(address, prop) {
                    Some(track_id) => {
                        sequence.set_position(sequence.position_snapped_to_grid());
                        editors.set_keyframe_at_position(
                            address,
                            &track_id,
                            sequence.position(),
                            leaf.clone(),
                            |p| sequence.closest_grid_position(p),
                        )
                    }
                    None => editors.set_value_of_primitive_prop(address, prop, leaf.clone()),
                }
            })
        })?
    }

    /// Return the props at `pointer` to their defaults: removes the keyframe
    /// at the snapped playhead for sequenced props and the static override
    /// for the others.
    pub fn unset(&self, pointer: &StudioPointer) -> Result<()> {
        self.ensure_open()?;
        let object = sheet_object_root(pointer)?;
        let defaults = object
            .template()
            .default_at(pointer.path())
            .ok_or_else(|| StoreError::InvalidValue {
                path: display_path(pointer.path()),
                reason: "unknown prop".to_string(),
            })?;

        let address = object.address();
        let position = object.sequence().position_snapped_to_grid();
        self.with_open(|drafts| {
            let mut editors = StateEditors::new(drafts);
            try_for_each_leaf(&defaults, pointer.path(), |_, prop| {
                match editors.track_id_for_prop(address, prop) {
                    Some(track_id) => {
                        editors.unset_keyframe_at_position(address, &track_id, position)
                    }
                    None => {
                        editors.unset_value_of_primitive_prop(address, prop);
                        Ok(())
                    }
                }
            })
        })?
    }

    /// Read through `pointer` as the drafts currently stand.
    pub fn read(&self, pointer: &StudioPointer) -> Result<Option<Value>> {
        let state = self.with_open(|drafts| drafts.current_state())?;
        read_pointer(pointer, &state, self.store)
    }

    /// Direct access to the drafts.
    pub fn with_drafts<T, E>(
        &self,
        f: impl FnOnce(&mut Drafts) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        self.with_open(f)?
    }

    /// Typed editors over the drafts.
    pub fn editors<T, E>(
        &self,
        f: impl FnOnce(&mut StateEditors<'_>) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        self.with_open(|drafts| f(&mut StateEditors::new(drafts)))?
    }
}

fn sheet_object_root(pointer: &StudioPointer) -> Result<&Rc<SheetObject>> {
    match pointer.root() {
        PointerRoot::SheetObject(object) => Ok(object),
        PointerRoot::Store(_) => Err(StoreError::InvalidTarget {
            pointer: pointer.to_string(),
        }),
    }
}

/// Frozen result of a transaction, waiting to be committed or discarded.
///
/// Holds the store exclusively, so no other transaction can start until this
/// one is settled. Dropping it discards.
#[must_use = "a pending transaction is discarded unless committed"]
pub struct PendingTransaction<'a> {
    store: &'a mut StudioStore,
    proposed: StoreState,
    settled: bool,
}

impl PendingTransaction<'_> {
    /// The state a commit would install.
    pub fn proposed(&self) -> &StoreState {
        &self.proposed
    }

    /// Whether committing would leave the store untouched.
    pub fn is_noop(&self) -> bool {
        self.proposed.same_as(self.store.state())
    }

    /// Read through `pointer` against the proposed state.
    pub fn read(&self, pointer: &StudioPointer) -> Result<Option<Value>> {
        read_pointer(pointer, &self.proposed, self.store.atom_id())
    }

    /// Install the proposed state.
    pub fn commit(mut self) {
        self.settled = true;
        let proposed = std::mem::take(&mut self.proposed);
        self.store.apply(proposed);
    }

    /// Drop the proposed state. The store is left as it was.
    pub fn discard(mut self) {
        self.settled = true;
        tracing::debug!("transaction discarded");
    }
}

impl Drop for PendingTransaction<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("pending transaction dropped without commit or discard; discarding");
        }
    }
}

impl StudioStore {
    /// Run `f` against drafts of the current state.
    ///
    /// If `f` fails its error is returned unchanged and the store is left
    /// exactly as it was. Otherwise the frozen drafts are returned as a
    /// [`PendingTransaction`].
    pub fn temp_transaction<F, E>(&mut self, f: F) -> std::result::Result<PendingTransaction<'_>, E>
    where
        F: FnOnce(&TransactionApi) -> std::result::Result<(), E>,
        E: From<StoreError>,
    {
        let api = TransactionApi::open(self.state(), self.atom_id());
        let outcome = f(&api);
        let drafts = api.close()?;
        if let Err(err) = outcome {
            tracing::debug!("transaction failed; drafts dropped");
            return Err(err);
        }
        Ok(PendingTransaction {
            store: self,
            proposed: drafts.finish(),
            settled: false,
        })
    }

    /// [`temp_transaction`](Self::temp_transaction) followed by a commit.
    pub fn transaction<F, E>(&mut self, f: F) -> std::result::Result<(), E>
    where
        F: FnOnce(&TransactionApi) -> std::result::Result<(), E>,
        E: From<StoreError>,
    {
        self.temp_transaction(f)?.commit();
        Ok(())
    }
}
