//! Domain layer: chain continuity rules and state-store error types.

pub mod chain;
pub mod errors;
