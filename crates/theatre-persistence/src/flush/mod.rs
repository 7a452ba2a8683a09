//! Deciding when the store should write its persistent partitions.
//!
//! - `FlushPolicy` - debounce and maximum-delay settings
//! - `ChangeTracker` - unsaved changes since the last successful flush

mod policy;
mod tracker;

pub use policy::FlushPolicy;
pub use tracker::ChangeTracker;
