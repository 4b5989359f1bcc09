//! # Runtime Ports
//!
//! The pipeline consumes the subsystem crates through their own inbound
//! ports. The two ports defined here are the runtime's own seams: where
//! the node membership comes from and where accepted files go.

pub mod outbound;
