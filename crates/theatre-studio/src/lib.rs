//! Transactional state store of Theatre Studio.
//!
//! The store keeps studio state in three partitions (`historic`, `ahistoric`
//! and `ephemeral`) and changes them only through transactions:
//!
//! - **Transactions** run a closure against copy-on-write drafts. A failing
//!   closure leaves the store exactly as it was; a successful one yields a
//!   [`PendingTransaction`] to commit or discard.
//! - **History** records every commit that changed the historic partition,
//!   with linear undo/redo.
//! - **Save files** ([`OnDiskState`]) are snapshots of one project, stamped
//!   with a strictly increasing revision.
//! - **Persistence** writes the historic and ahistoric partitions to disk via
//!   `theatre-persistence`.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use theatre_studio::{
//!     InitializeOptions, ObjectTemplate, PropType, Sequence, SheetObject, SheetObjectAddress,
//!     StudioStore,
//! };
//!
//! let mut store = StudioStore::default();
//! store.initialize(&InitializeOptions::in_memory())?;
//!
//! let address = SheetObjectAddress::new(
//!     "p1".parse()?,
//!     "Scene".parse()?,
//!     "default".parse()?,
//!     "obj1".parse()?,
//! );
//! let template = ObjectTemplate::new([("size", PropType::number(1.0))]);
//! let obj = Rc::new(SheetObject::new(address, template, Rc::new(Sequence::new(10.0, 30))));
//! let size = obj.props_pointer().key("size");
//!
//! store.transaction(|api| api.set(&size, 42))?;
//! assert_eq!(store.read(&size)?.and_then(|v| v.as_f64()), Some(42.0));
//!
//! store.undo();
//! assert_eq!(store.read(&size)?.and_then(|v| v.as_f64()), Some(1.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

mod config;
mod error;
mod ids;
mod sheet_object;
mod store;

pub use config::{HistoryConfig, PersistenceConfig, RevisionConfig, StudioConfig};
pub use error::{ConfigError, ModelError, Result, StoreError};
pub use ids::{
    KeyframeId, ObjectKey, ProjectId, SequenceTrackId, SheetId, SheetInstanceId,
    SheetObjectAddress,
};
pub use sheet_object::{ObjectTemplate, PointerRoot, PropType, Sequence, SheetObject, StudioPointer};
pub use store::{
    CURRENT_DEFINITION_VERSION, DiskStateRevision, Drafts, History, HistoryEntry,
    InitializeOptions, Keyframe, OnDiskState, Partition, PendingTransaction, SequenceState,
    SheetState, StateEditors, StaticOverrides, StoreState, StudioStore, TrackData,
    TracksOfObject, TransactionApi,
};

pub use theatre_dataverse::{PathSegment, Value, keys};
pub use theatre_persistence::FlushPolicy;
