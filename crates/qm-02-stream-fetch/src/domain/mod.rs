//! # Domain Layer
//!
//! Error taxonomy for source and fetch failures.

pub mod errors;
