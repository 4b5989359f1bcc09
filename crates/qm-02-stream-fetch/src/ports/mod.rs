//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the pipeline uses
//! - **Outbound (Driven)**: The per-node object stores this subsystem reads

pub mod inbound;
pub mod outbound;
