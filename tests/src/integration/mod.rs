//! # Integration Tests
//!
//! Multi-cycle acceptance flows over whole pipelines: catch-up, retry,
//! resume, chain halts and recovery, membership changes, and an
//! end-to-end run over the real filesystem adapters.

pub mod flows;
