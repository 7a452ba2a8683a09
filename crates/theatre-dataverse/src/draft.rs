//! Copy-on-write drafts over a [`Value`] tree.
//!
//! A draft starts out sharing every node with its base. Each write copies the
//! nodes on the written path (`Arc::make_mut`) and nothing else, so finishing
//! a draft yields a new tree that shares all untouched subtrees with the base.
//! The base itself is never mutated.

use std::sync::Arc;

use crate::error::DraftError;
use crate::path::{PathSegment, display_path};
use crate::value::Value;

/// Mutable working copy of an immutable value.
///
/// [`finish`](Draft::finish) consumes the draft, so a finished draft cannot be
/// written to again.
#[derive(Debug)]
pub struct Draft {
    base: Value,
    current: Value,
}

impl Draft {
    pub fn new(base: &Value) -> Self {
        Self {
            base: base.clone(),
            current: base.clone(),
        }
    }

    /// The value this draft was created from.
    pub fn base(&self) -> &Value {
        &self.base
    }

    /// The value as currently edited.
    pub fn current(&self) -> &Value {
        &self.current
    }

    pub fn get(&self, path: &[PathSegment]) -> Option<&Value> {
        self.current.get_path(path)
    }

    /// Whether any effective write happened.
    pub fn is_modified(&self) -> bool {
        !Value::same_node(&self.base, &self.current)
    }

    /// Write `value` at `path`, creating missing (or null) intermediate objects.
    ///
    /// Writing a value equal to the one already present leaves the tree
    /// untouched. On error nothing is written.
    pub fn set(&mut self, path: &[PathSegment], value: impl Into<Value>) -> Result<(), DraftError> {
        let value = value.into();
        if self.current.get_path(path) == Some(&value) {
            return Ok(());
        }
        check_writable(&self.current, path)?;
        write(&mut self.current, path, value);
        Ok(())
    }

    /// Replace the value at `path` with `f(current)`.
    pub fn update<F>(&mut self, path: &[PathSegment], f: F) -> Result<(), DraftError>
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let next = f(self.current.get_path(path));
        self.set(path, next)
    }

    /// Remove the value at `path`. Returns the removed value, or `None` when
    /// nothing was there (in which case the tree is untouched).
    pub fn remove(&mut self, path: &[PathSegment]) -> Option<Value> {
        let (last, parent_path) = path.split_last()?;
        self.current.get_path(path)?;
        match (node_mut(&mut self.current, parent_path)?, last) {
            (Value::Object(map), PathSegment::Key(key)) => Arc::make_mut(map).remove(key),
            (Value::Array(items), PathSegment::Index(index)) => {
                Some(Arc::make_mut(items).remove(*index))
            }
            _ => None,
        }
    }

    /// Remove the value at `path`, then remove every ancestor object that the
    /// removal left empty, stopping before the ancestor at depth `keep_depth`.
    pub fn remove_and_prune(&mut self, path: &[PathSegment], keep_depth: usize) -> Option<Value> {
        let removed = self.remove(path)?;
        let mut end = path.len() - 1;
        while end > keep_depth {
            let parent = &path[..end];
            let is_empty = self
                .current
                .get_path(parent)
                .and_then(Value::as_object)
                .is_some_and(|map| map.is_empty());
            if !is_empty {
                break;
            }
            self.remove(parent);
            end -= 1;
        }
        Some(removed)
    }

    /// Freeze the draft into an immutable value.
    pub fn finish(self) -> Value {
        self.current
    }
}

/// Reject paths that cross an existing value of the wrong kind.
fn check_writable(root: &Value, path: &[PathSegment]) -> Result<(), DraftError> {
    let mut node = Some(root);
    for (depth, segment) in path.iter().enumerate() {
        let Some(current) = node else {
            // Everything below a missing key is created fresh.
            return Ok(());
        };
        node = match (current, segment) {
            (Value::Null, PathSegment::Key(_)) => None,
            (Value::Object(map), PathSegment::Key(key)) => map.get(key),
            (Value::Array(items), PathSegment::Index(index)) => {
                if *index > items.len() {
                    return Err(DraftError::IndexOutOfBounds {
                        path: display_path(&path[..depth]),
                        index: *index,
                        len: items.len(),
                    });
                }
                items.get(*index)
            }
            (other, _) => {
                return Err(DraftError::PathConflict {
                    path: display_path(&path[..depth]),
                    found: other.kind(),
                });
            }
        };
    }
    Ok(())
}

/// Path-copying write. The path must have passed [`check_writable`].
fn write(node: &mut Value, path: &[PathSegment], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if node.is_null() {
        *node = Value::object();
    }
    let child = match (node, head) {
        (Value::Object(map), PathSegment::Key(key)) => Arc::make_mut(map)
            .entry(key.clone())
            .or_insert(Value::Null),
        (Value::Array(items), PathSegment::Index(index)) => {
            let items = Arc::make_mut(items);
            if *index == items.len() {
                items.push(Value::Null);
            }
            &mut items[*index]
        }
        _ => return,
    };
    write(child, rest, value);
}

/// Mutable access to an existing node, copying every node on the way down.
fn node_mut<'a>(node: &'a mut Value, path: &[PathSegment]) -> Option<&'a mut Value> {
    let Some((head, rest)) = path.split_first() else {
        return Some(node);
    };
    let child = match (node, head) {
        (Value::Object(map), PathSegment::Key(key)) => Arc::make_mut(map).get_mut(key)?,
        (Value::Array(items), PathSegment::Index(index)) => {
            Arc::make_mut(items).get_mut(*index)?
        }
        _ => return None,
    };
    node_mut(child, rest)
}
