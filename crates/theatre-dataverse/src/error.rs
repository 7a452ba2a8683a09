use thiserror::Error;

use crate::AtomId;

/// Errors raised while writing into a [`Draft`](crate::Draft).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The path walks through a value that cannot hold the next segment.
    #[error("cannot write through {found} at `{path}`")]
    PathConflict { path: String, found: &'static str },

    /// An array index past the end (appending at `len` is allowed).
    #[error("index {index} is out of bounds at `{path}` (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Errors raised by reactive cells and pointers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataverseError {
    #[error("pointer is rooted at {pointer_root}, not at {atom}")]
    ForeignPointer { atom: AtomId, pointer_root: AtomId },
}
