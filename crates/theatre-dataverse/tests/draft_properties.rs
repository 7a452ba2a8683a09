//! Property tests for copy-on-write drafts.

use proptest::prelude::*;
use theatre_dataverse::{Draft, PathSegment, Value, diff_paths};

#[derive(Debug, Clone)]
enum Op {
    Set(Vec<String>, i32),
    Remove(Vec<String>),
}

fn key_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4)
        .prop_map(|keys| keys.into_iter().map(str::to_string).collect())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key_path(), -5i32..5).prop_map(|(path, v)| Op::Set(path, v)),
        key_path().prop_map(Op::Remove),
    ]
}

fn segments(path: &[String]) -> Vec<PathSegment> {
    path.iter().map(|k| PathSegment::from(k.as_str())).collect()
}

/// Deep-clone reference model of the same operations.
fn apply_to_model(model: &mut serde_json::Value, op: &Op) {
    match op {
        Op::Set(path, v) => {
            let mut node = model;
            for (i, key) in path.iter().enumerate() {
                if !node.is_object() {
                    if node.is_null() {
                        *node = serde_json::json!({});
                    } else {
                        // the draft rejects this write; mirror that by skipping it
                        return;
                    }
                }
                let last = i == path.len() - 1;
                let map = node.as_object_mut().unwrap();
                if last {
                    map.insert(key.clone(), serde_json::json!(v));
                    return;
                }
                node = map.entry(key.clone()).or_insert(serde_json::Value::Null);
            }
        }
        Op::Remove(path) => {
            let (last, parents) = path.split_last().unwrap();
            let mut node = model;
            for key in parents {
                match node.get_mut(key) {
                    Some(child) => node = child,
                    None => return,
                }
            }
            if let Some(map) = node.as_object_mut() {
                map.remove(last);
            }
        }
    }
}

/// True if some strict prefix of `path` holds a non-object, non-null value.
fn crosses_scalar(model: &serde_json::Value, path: &[String]) -> bool {
    let mut node = model;
    for key in &path[..path.len() - 1] {
        match node.get(key) {
            Some(child) if child.is_object() => node = child,
            Some(child) if child.is_null() => return false,
            Some(_) => return true,
            None => return false,
        }
    }
    false
}

proptest! {
    #[test]
    fn draft_matches_deep_clone_model_and_never_touches_base(ops in prop::collection::vec(op(), 0..24)) {
        let base = Value::from_entries([("a", Value::from_entries([("b", 1)]))]);
        let snapshot = serde_json::to_value(&base).unwrap();
        let mut model = snapshot.clone();
        let mut draft = Draft::new(&base);

        for op in &ops {
            match op {
                Op::Set(path, v) => {
                    let rejected = crosses_scalar(&model, path);
                    let result = draft.set(&segments(path), *v);
                    prop_assert_eq!(result.is_err(), rejected);
                }
                Op::Remove(path) => {
                    draft.remove(&segments(path));
                }
            }
            apply_to_model(&mut model, op);
        }

        let finished = draft.finish();
        prop_assert_eq!(serde_json::to_value(&finished).unwrap(), model);
        prop_assert_eq!(serde_json::to_value(&base).unwrap(), snapshot);
    }

    #[test]
    fn diff_is_empty_exactly_when_values_are_equal(ops in prop::collection::vec(op(), 0..12)) {
        let base = Value::from_entries([("a", 1), ("b", 2)]);
        let mut draft = Draft::new(&base);
        for op in &ops {
            match op {
                Op::Set(path, v) => { let _ = draft.set(&segments(path), *v); }
                Op::Remove(path) => { draft.remove(&segments(path)); }
            }
        }
        let finished = draft.finish();
        prop_assert_eq!(diff_paths(&base, &finished).is_empty(), base == finished);
    }
}
