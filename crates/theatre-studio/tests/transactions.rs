mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{obj1, sequence, store};
use proptest::prelude::*;
use theatre_dataverse::DataverseError;
use theatre_studio::{StoreError, StudioStore, Value, keys};

#[derive(Debug, PartialEq)]
enum EditError {
    Store(String),
    Rejected(&'static str),
}

impl From<StoreError> for EditError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

#[test]
fn set_is_visible_inside_the_transaction_and_gone_after_discard() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();

    let pending = store
        .temp_transaction(|api| {
            api.set(&size, 42)?;
            assert_eq!(api.read(&size)?, Some(Value::from(42)));
            Ok::<(), StoreError>(())
        })
        .expect("transaction");
    assert!(!pending.is_noop());
    assert_eq!(pending.read(&size).unwrap(), Some(Value::from(42)));
    pending.discard();

    assert_eq!(store.read(&size).unwrap(), Some(Value::from(1)));
    assert!(!store.history().can_undo());
}

#[test]
fn failing_callback_leaves_every_partition_identical() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();
    store.transaction(|api| api.set(&size, 7)).unwrap();
    let before = store.state().clone();

    let result = store.transaction(|api| {
        api.set(&size, 5)?;
        api.with_drafts(|drafts| {
            drafts
                .ahistoric
                .set(&keys(["panel"]), "open")
                .map_err(StoreError::from)?;
            drafts
                .ephemeral
                .set(&keys(["busy"]), true)
                .map_err(StoreError::from)?;
            Ok::<(), EditError>(())
        })?;
        Err(EditError::Rejected("nope"))
    });

    assert_eq!(result, Err(EditError::Rejected("nope")));
    assert!(store.state().same_as(&before));
    assert_eq!(store.history().undo_len(), 1);
}

#[test]
fn store_pointers_are_not_writable() {
    let mut store = store();
    let target = store.pointer().key("historic").key("anything");

    let err = store.transaction(|api| api.set(&target, 1)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidTarget { .. }));
    let err = store.transaction(|api| api.unset(&target)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidTarget { .. }));
}

#[test]
fn api_handles_go_stale_when_the_transaction_returns() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();

    let mut leaked = None;
    store
        .transaction(|api| {
            leaked = Some(api.clone());
            assert!(api.is_open());
            Ok::<(), StoreError>(())
        })
        .unwrap();
    let api = leaked.unwrap();

    assert!(!api.is_open());
    assert!(matches!(api.set(&size, 3), Err(StoreError::TransactionFinished)));
    assert!(matches!(api.unset(&size), Err(StoreError::TransactionFinished)));
    assert!(matches!(api.read(&size), Err(StoreError::TransactionFinished)));
    assert_eq!(store.read(&size).unwrap(), Some(Value::from(1)));
}

#[test]
fn stale_handles_fail_before_arguments_are_checked() {
    let seq = sequence();
    let obj = obj1(&seq);
    let mut store = store();
    let store_target = store.pointer().key("historic").key("x");

    let mut leaked = None;
    store
        .transaction(|api| {
            leaked = Some(api.clone());
            Ok::<(), StoreError>(())
        })
        .unwrap();
    let api = leaked.unwrap();

    assert!(matches!(
        api.set(&store_target, 1),
        Err(StoreError::TransactionFinished)
    ));
    assert!(matches!(
        api.unset(&store_target),
        Err(StoreError::TransactionFinished)
    ));
    assert!(matches!(
        api.set(&obj.props_pointer().key("size"), 5000),
        Err(StoreError::TransactionFinished)
    ));
    assert!(matches!(
        api.unset(&obj.props_pointer().key("nope")),
        Err(StoreError::TransactionFinished)
    ));
}

#[test]
fn all_null_set_leaves_the_store_untouched() {
    let seq = sequence();
    let obj = obj1(&seq);
    let position = obj.props_pointer().key("position");
    let mut store = store();
    let before = store.state().clone();

    store
        .transaction(|api| {
            api.set(
                &position,
                Value::from_entries([("x", Value::Null), ("y", Value::Null)]),
            )
        })
        .unwrap();

    assert!(store.state().same_as(&before));
    assert!(store.project_ids().is_empty());
    assert!(!store.history().can_undo());
}

#[test]
fn reentrant_draft_access_is_rejected() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();

    store
        .transaction(|api| {
            let inner = api.with_drafts(|_| Ok::<_, StoreError>(api.set(&size, 2)))?;
            assert!(matches!(inner, Err(StoreError::DraftsBusy)));
            Ok::<(), StoreError>(())
        })
        .unwrap();
}

#[test]
fn compound_values_are_written_leaf_by_leaf() {
    let seq = sequence();
    let obj = obj1(&seq);
    let position = obj.props_pointer().key("position");
    let mut store = store();

    store
        .transaction(|api| {
            api.set(
                &position,
                Value::from_entries([("x", Value::from(3)), ("y", Value::Null)]),
            )
        })
        .unwrap();

    assert_eq!(
        store.read(&position).unwrap(),
        Some(Value::from_entries([("x", 3.0), ("y", 0.0)]))
    );
    let whole = store.read(&obj.props_pointer()).unwrap().unwrap();
    assert_eq!(whole.get_key("label"), Some(&Value::from("box")));
}

#[test]
fn invalid_values_are_rejected_before_anything_is_written() {
    let seq = sequence();
    let obj = obj1(&seq);
    let mut store = store();
    let before = store.state().clone();

    let err = store
        .transaction(|api| {
            api.set(
                &obj.props_pointer(),
                Value::from_entries([("size", Value::from(2)), ("colour", Value::from("red"))]),
            )
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidValue { ref path, .. } if path == "colour"));

    let err = store
        .transaction(|api| api.set(&obj.props_pointer().key("size"), "big"))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidValue { .. }));
    assert!(store.state().same_as(&before));
}

#[test]
fn unset_restores_the_default_and_prunes_the_override() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();
    let overrides = [
        "historic",
        "coreByProject",
        "p1",
        "sheetsById",
        "Scene",
        "staticOverrides",
        "byObject",
    ]
    .into_iter()
    .fold(store.pointer(), |pointer, key| pointer.key(key));

    store.transaction(|api| api.set(&size, 42)).unwrap();
    assert!(store.read(&overrides.key("obj1")).unwrap().is_some());

    store.transaction(|api| api.unset(&size)).unwrap();
    assert_eq!(store.read(&size).unwrap(), Some(Value::from(1)));
    assert_eq!(store.read(&overrides.key("obj1")).unwrap(), None);
    assert_eq!(store.history().undo_len(), 2);
}

#[test]
fn sequenced_props_get_keyframes_at_the_snapped_playhead() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();

    seq.set_position(1.01);
    store
        .transaction(|api| {
            api.editors(|editors| {
                editors
                    .set_primitive_prop_as_sequenced(obj.address(), &keys(["size"]), &seq)
                    .map(|_| ())
            })?;
            api.set(&size, 10)
        })
        .unwrap();
    assert_eq!(seq.position(), 1.0);

    seq.set_position(3.0);
    store.transaction(|api| api.set(&size, 30)).unwrap();

    let read_at = |store: &StudioStore, position: f64| {
        seq.set_position(position);
        store.read(&size).unwrap().and_then(|v| v.as_f64())
    };
    assert_eq!(read_at(&store, 0.0), Some(10.0));
    assert_eq!(read_at(&store, 2.0), Some(10.0));
    assert_eq!(read_at(&store, 5.0), Some(30.0));

    seq.set_position(3.0);
    store.transaction(|api| api.unset(&size)).unwrap();
    assert_eq!(read_at(&store, 5.0), Some(10.0));
}

#[test]
fn observers_see_commits_only() {
    let seq = sequence();
    let obj = obj1(&seq);
    let size = obj.props_pointer().key("size");
    let mut store = store();

    let seen = Rc::new(Cell::new(0));
    let counter = Rc::clone(&seen);
    let id = store.subscribe(move |_| counter.set(counter.get() + 1));

    store.transaction(|api| api.set(&size, 2)).unwrap();
    assert_eq!(seen.get(), 1);

    store.temp_transaction(|api| api.set(&size, 3)).unwrap().discard();
    let _ = store.transaction(|api| {
        api.set(&size, 4)?;
        Err::<(), _>(StoreError::DraftsBusy)
    });
    {
        // dropped without settling
        let _pending = store.temp_transaction(|api| api.set(&size, 5)).unwrap();
    }
    assert_eq!(seen.get(), 1);
    assert_eq!(store.read(&size).unwrap(), Some(Value::from(2)));

    assert!(store.unsubscribe(id));
    store.undo();
    assert_eq!(seen.get(), 1);
}

#[test]
fn empty_transactions_record_no_history() {
    let mut store = store();
    let initialised = store.pointer().key("ephemeral").key("initialised");

    store
        .transaction(|api| {
            assert_eq!(api.read(&initialised)?, Some(Value::from(true)));
            Ok::<(), StoreError>(())
        })
        .unwrap();
    assert!(!store.history().can_undo());
    assert!(store.is_initialised());
}

#[test]
fn pointers_of_another_store_are_rejected() {
    let store = store();
    let other = StudioStore::default();
    let err = store.read(&other.pointer().key("historic")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Dataverse(DataverseError::ForeignPointer { .. })
    ));
}

proptest! {
    #[test]
    fn any_failing_transaction_is_invisible(
        committed in prop::collection::vec(0u32..1000, 0..5),
        attempted in prop::collection::vec(0u32..1000, 1..5),
    ) {
        let seq = sequence();
        let obj = obj1(&seq);
        let size = obj.props_pointer().key("size");
        let mut store = store();
        for value in &committed {
            store.transaction(|api| api.set(&size, *value)).unwrap();
        }
        let before = store.state().clone();
        let undo_len = store.history().undo_len();

        let result = store.transaction(|api| {
            for value in &attempted {
                api.set(&size, *value)?;
            }
            Err::<(), _>(EditError::Rejected("late failure"))
        });

        prop_assert_eq!(result, Err(EditError::Rejected("late failure")));
        prop_assert!(store.state().same_as(&before));
        prop_assert_eq!(store.history().undo_len(), undo_len);
    }
}
