//! # Quorum-Mirror Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Cluster fixtures shared by all suites
//! │
//! ├── integration/      # Multi-cycle acceptance flows
//! │   └── flows.rs
//! │
//! └── adversarial.rs    # Byzantine scenarios: forgery, collusion,
//!                       # equivocation, corrupt serving
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p mirror-tests
//!
//! # By category
//! cargo test -p mirror-tests integration::
//! cargo test -p mirror-tests adversarial::
//!
//! # Benchmarks
//! cargo bench -p mirror-tests
//! ```

#![allow(dead_code)]

pub mod adversarial;
pub mod integration;
pub mod support;
