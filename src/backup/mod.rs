//! Backup naming and catalog handling.
//!
//! The on-wire name format `<prefix>_<RFC3339>.backup[.age]` is the only
//! persisted artifact of this tool; [name] generates and parses it and
//! [catalog] builds the retention ordering on top of it.

pub mod catalog;
pub mod name;

pub use name::NameError;
