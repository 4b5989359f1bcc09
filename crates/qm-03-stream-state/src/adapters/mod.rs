//! Cursor store adapters.

pub mod file;
pub mod memory;
