//! Port definitions.
//!
//! This subsystem has no inbound port: chain validation is a pure function
//! called directly by the pipeline. The one seam is outbound, to whatever
//! holds the durable cursor.

pub mod outbound;
