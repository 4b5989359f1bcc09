//! # Attestation Subsystem (QM-01)
//!
//! Decides whether the network vouches for a file. Every consensus node
//! publishes a detached signature object next to each artifact it produces;
//! this subsystem verifies those signatures against the current registry
//! snapshot and resolves which content hash, if any, is attested by a strict
//! supermajority of all known nodes.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure verification and quorum logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound interfaces
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Counting Rules
//!
//! - Node identities, not signature objects, are the unit of counting; a
//!   node that submits two signatures for one filename still gets one vote.
//! - A hash wins only when strictly more than two thirds of *all known*
//!   nodes attest to it, not two thirds of the nodes that responded.
//! - An unknown node or an unreachable source is an abstention, never a vote
//!   against.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::errors::{SignatureError, SignatureResult};
pub use domain::quorum::{required_agreement, QuorumDecision, QuorumResult};
pub use domain::verification::verify_claim;
pub use ports::inbound::AttestationApi;
pub use service::AttestationService;
