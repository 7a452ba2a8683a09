mod common;

use std::path::Path;
use std::time::{Duration, Instant};

use common::{obj1, sequence};
use tempfile::tempdir;
use theatre_persistence::{PersistedState, PersistenceError, StateStorage};
use theatre_studio::{
    FlushPolicy, InitializeOptions, StoreError, StudioConfig, StudioStore, Value, keys,
};

const KEY: &str = "studio";

fn persistent_store(directory: &Path, flush: FlushPolicy) -> Result<StudioStore, StoreError> {
    let mut config = StudioConfig::default();
    config.persistence.directory = directory.to_path_buf();
    config.persistence.flush = flush;
    let mut store = StudioStore::new(config);
    store.initialize(&InitializeOptions::persistent(KEY))?;
    Ok(store)
}

#[test]
fn flushed_state_is_restored_by_the_next_session() {
    let dir = tempdir().unwrap();
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");

    let mut first = persistent_store(dir.path(), FlushPolicy::default()).unwrap();
    first
        .transaction(|api| {
            api.set(&size, 42)?;
            api.with_drafts(|drafts| {
                drafts.ahistoric.set(&keys(["panel"]), "open")?;
                drafts.ephemeral.set(&keys(["dragging"]), true)?;
                Ok::<(), StoreError>(())
            })
        })
        .unwrap();
    assert!(first.has_unsaved_changes());
    first.flush().unwrap();
    assert!(!first.has_unsaved_changes());
    assert!(dir.path().join("studio.json").exists());

    let second = persistent_store(dir.path(), FlushPolicy::default()).unwrap();
    assert!(second.is_initialised());
    assert_eq!(second.read(&size).unwrap(), Some(Value::from(42)));
    let panel = second.pointer().key("ahistoric").key("panel");
    assert_eq!(second.read(&panel).unwrap(), Some(Value::from("open")));
    let dragging = second.pointer().key("ephemeral").key("dragging");
    assert_eq!(second.read(&dragging).unwrap(), None);
    assert!(!second.history().can_undo());
    assert!(!second.has_unsaved_changes());
}

#[test]
fn undo_marks_the_store_dirty() {
    let dir = tempdir().unwrap();
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");

    let mut store = persistent_store(dir.path(), FlushPolicy::default()).unwrap();
    store.transaction(|api| api.set(&size, 3)).unwrap();
    store.flush().unwrap();

    assert!(store.undo());
    assert!(store.has_unsaved_changes());
}

#[test]
fn in_memory_stores_never_touch_the_disk() {
    let dir = tempdir().unwrap();
    let seq = sequence();
    let obj = obj1(&seq);

    let mut config = StudioConfig::default();
    config.persistence.directory = dir.path().to_path_buf();
    let mut store = StudioStore::new(config);
    store.initialize(&InitializeOptions::in_memory()).unwrap();
    store
        .transaction(|api| api.set(&obj.props_pointer().key("size"), 2))
        .unwrap();

    store.flush().unwrap();
    assert!(!store.flush_if_due(Instant::now() + Duration::from_secs(60)).unwrap());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn automatic_flush_waits_for_the_debounce() {
    let dir = tempdir().unwrap();
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");

    let mut store = persistent_store(dir.path(), FlushPolicy::default()).unwrap();
    store.transaction(|api| api.set(&size, 7)).unwrap();
    let committed = Instant::now();

    assert!(!store.flush_if_due(committed).unwrap());
    assert!(store.has_unsaved_changes());

    assert!(store.flush_if_due(committed + Duration::from_secs(2)).unwrap());
    assert!(!store.has_unsaved_changes());
    assert!(!store.flush_if_due(committed + Duration::from_secs(4)).unwrap());
}

#[test]
fn disabled_policy_leaves_flushing_to_the_caller() {
    let dir = tempdir().unwrap();
    let seq = sequence();
    let obj = obj1(&seq);

    let mut store = persistent_store(dir.path(), FlushPolicy::disabled()).unwrap();
    store
        .transaction(|api| api.set(&obj.props_pointer().key("size"), 7))
        .unwrap();

    assert!(!store.flush_if_due(Instant::now() + Duration::from_secs(3600)).unwrap());
    assert!(store.has_unsaved_changes());
}

#[test]
fn corrupt_state_files_fail_initialisation() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("studio.json"), "not json").unwrap();

    let err = persistent_store(dir.path(), FlushPolicy::default()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(PersistenceError::Deserialization { .. })
    ));
}

#[test]
fn partitions_must_be_objects() {
    let dir = tempdir().unwrap();
    StateStorage::new(dir.path(), KEY)
        .save(&mut PersistedState::new(Value::from(3), Value::object()))
        .unwrap();

    let err = persistent_store(dir.path(), FlushPolicy::default()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(PersistenceError::InvalidFormat { .. })
    ));
}
