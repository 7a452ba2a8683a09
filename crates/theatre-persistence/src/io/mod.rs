//! File I/O for studio state.
//!
//! - Saving with atomic writes
//! - Loading with format and schema validation

mod load;
mod save;

pub use load::load_state;
pub use save::{save_state, write_atomic};
