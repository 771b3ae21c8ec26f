//! Command implementations behind the two binaries.

pub mod find_root;
pub mod set;

pub use find_root::execute_find_root;
pub use set::{SetOptions, SetOutcome, execute_set};
