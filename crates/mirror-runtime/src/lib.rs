//! # Mirror Runtime Library
//!
//! Composition root of the Quorum-Mirror service: configuration, the
//! acceptance pipeline, per-stream schedulers, and the filesystem
//! adapters behind the runtime's own ports. The subsystem crates stay
//! ignorant of each other; everything meets here.
//!
//! The binary in `main.rs` is a thin shell over these modules; they are
//! public so the integration suite can wire pipelines its own way.

pub mod adapters;
pub mod config;
pub mod container;
pub mod errors;
pub mod pipeline;
pub mod ports;
pub mod scheduler;

pub use config::{ConfigError, MirrorConfig};
pub use container::MirrorContainer;
pub use errors::{PipelineError, RegistryError, SinkError};
pub use pipeline::{CycleOutcome, CycleReport, Pipeline};
pub use scheduler::run_stream_loop;
