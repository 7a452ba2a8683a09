//! Reactive state primitives for Theatre Studio.
//!
//! This crate provides the building blocks the studio store is made of:
//!
//! - **[`Value`]** - a JSON-like tree whose arrays and objects are shared
//!   through `Arc`, so cloning is O(1) and untouched subtrees are reused
//! - **[`Draft`]** - a copy-on-write working copy of a `Value`; writes copy
//!   only the nodes on the mutated path
//! - **[`Atom`]** - a reactive cell that notifies observers synchronously
//! - **[`Pointer`]** - an inert `{root, path}` address resolved on read
//!
//! # Example
//!
//! ```
//! use theatre_dataverse::{Atom, Draft, PathSegment, Value};
//!
//! let mut atom = Atom::new(Value::object());
//! let size = atom.pointer().key("size");
//!
//! let mut draft = Draft::new(atom.get());
//! draft.set(size.path(), 42).unwrap();
//! atom.set(draft.finish());
//!
//! assert_eq!(atom.val(&size).unwrap(), Some(Value::from(42)));
//! # let _ = PathSegment::from("unused");
//! ```

#![deny(unsafe_code)]

mod atom;
mod draft;
mod error;
pub mod path;
mod pointer;
mod value;

pub use atom::{Atom, AtomId, SubscriptionId};
pub use draft::Draft;
pub use error::{DataverseError, DraftError};
pub use path::{PathSegment, diff_paths, display_path, encode_path, for_each_leaf, keys};
pub use pointer::{Pointer, PointerParts, Traverse};
pub use value::{Map, Value};
