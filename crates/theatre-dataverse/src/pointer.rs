//! Inert addresses into state trees.

use std::fmt;

use crate::path::{PathSegment, display_path};
use crate::value::Value;

/// Anything a pointer path can be resolved against.
pub trait Traverse {
    /// Value at `path`, or `None` if a segment is missing.
    fn traverse(&self, path: &[PathSegment]) -> Option<Value>;
}

impl Traverse for Value {
    fn traverse(&self, path: &[PathSegment]) -> Option<Value> {
        self.get_path(path).cloned()
    }
}

/// A `{root, path}` address.
///
/// A pointer is plain data: it holds no subscription and never caches the
/// value it addresses. Reading through it always pulls the current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer<R> {
    root: R,
    path: Vec<PathSegment>,
}

/// Borrowed decomposition of a [`Pointer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerParts<'a, R> {
    pub root: &'a R,
    pub path: &'a [PathSegment],
}

impl<R> Pointer<R> {
    /// Pointer to the root itself.
    pub fn new(root: R) -> Self {
        Self {
            root,
            path: Vec::new(),
        }
    }

    pub fn with_path(root: R, path: Vec<PathSegment>) -> Self {
        Self { root, path }
    }

    pub fn root(&self) -> &R {
        &self.root
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn parts(&self) -> PointerParts<'_, R> {
        PointerParts {
            root: &self.root,
            path: &self.path,
        }
    }

    pub fn into_parts(self) -> (R, Vec<PathSegment>) {
        (self.root, self.path)
    }

    /// Pull the current value at this pointer's path out of `target`.
    pub fn resolve<T: Traverse + ?Sized>(&self, target: &T) -> Option<Value> {
        target.traverse(&self.path)
    }
}

impl<R: Clone> Pointer<R> {
    /// A pointer one segment deeper.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(segment.into());
        Self {
            root: self.root.clone(),
            path,
        }
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(key)
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(index)
    }
}

impl<R: fmt::Display> fmt::Display for Pointer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.root)
        } else {
            write!(f, "{}.{}", self.root, display_path(&self.path))
        }
    }
}
