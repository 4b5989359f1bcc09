//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the pipeline uses
//!
//! This subsystem has no outbound ports: keys arrive as part of the
//! per-cycle registry snapshot instead of being looked up through a gateway.

pub mod inbound;
