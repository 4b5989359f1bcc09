//! # Domain Layer
//!
//! Pure verification and quorum logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod errors;
pub mod quorum;
pub mod verification;
