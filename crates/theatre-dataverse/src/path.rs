//! Property paths and depth-first walks over value trees.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Build a path made only of keys.
pub fn keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<PathSegment> {
    keys.into_iter().map(PathSegment::from).collect()
}

/// Render a path as `a.b[2].c`.
pub fn display_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        if matches!(segment, PathSegment::Key(_)) && !out.is_empty() {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Encode a prop path as compact JSON array text, e.g. `["position","x"]`.
///
/// This is the key format of `trackIdByPropPath` tables.
pub fn encode_path(path: &[PathSegment]) -> String {
    serde_json::Value::Array(
        path.iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => serde_json::Value::String(key.clone()),
                PathSegment::Index(index) => serde_json::Value::from(*index),
            })
            .collect(),
    )
    .to_string()
}

/// Inverse of [`encode_path`].
pub fn decode_path(encoded: &str) -> Result<Vec<PathSegment>, serde_json::Error> {
    serde_json::from_str(encoded)
}

/// Value at `path`, if every segment exists.
pub fn get_deep<'a>(value: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    value.get_path(path)
}

/// Call `f` for every leaf under `value`, depth-first, in key order.
///
/// Objects are branches; everything else (arrays included) is a leaf. The path
/// handed to `f` is `base` followed by the keys walked from `value`, so a
/// scalar `value` yields a single call with `base` itself.
pub fn for_each_leaf<F>(value: &Value, base: &[PathSegment], mut f: F)
where
    F: FnMut(&Value, &[PathSegment]),
{
    let result = try_for_each_leaf(value, base, |leaf, path| {
        f(leaf, path);
        Ok::<(), Infallible>(())
    });
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

/// Fallible [`for_each_leaf`]; stops at the first error.
pub fn try_for_each_leaf<F, E>(value: &Value, base: &[PathSegment], mut f: F) -> Result<(), E>
where
    F: FnMut(&Value, &[PathSegment]) -> Result<(), E>,
{
    let mut path = base.to_vec();
    walk(value, &mut path, &mut f)
}

fn walk<F, E>(value: &Value, path: &mut Vec<PathSegment>, f: &mut F) -> Result<(), E>
where
    F: FnMut(&Value, &[PathSegment]) -> Result<(), E>,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter() {
                path.push(PathSegment::Key(key.clone()));
                let result = walk(child, path, f);
                path.pop();
                result?;
            }
            Ok(())
        }
        leaf => f(leaf, path),
    }
}

/// Leaf paths whose value differs between `before` and `after`.
///
/// Subtrees that are [`Value::same_node`] are skipped without being visited,
/// so the cost is proportional to the part of the tree a draft copied.
pub fn diff_paths(before: &Value, after: &Value) -> Vec<Vec<PathSegment>> {
    let mut out = Vec::new();
    diff_into(Some(before), Some(after), &mut Vec::new(), &mut out);
    out
}

fn diff_into(
    before: Option<&Value>,
    after: Option<&Value>,
    path: &mut Vec<PathSegment>,
    out: &mut Vec<Vec<PathSegment>>,
) {
    match (before, after) {
        (None, None) => {}
        (Some(a), Some(b)) if Value::same_node(a, b) => {}
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                path.push(PathSegment::Key(key.clone()));
                diff_into(a.get(key), b.get(key), path, out);
                path.pop();
            }
        }
        (Some(a), Some(b)) if a == b => {}
        _ => out.push(path.clone()),
    }
}
