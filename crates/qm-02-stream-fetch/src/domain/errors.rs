//! # Fetch Errors
//!
//! Two layers of failure: `SourceError` is what one node's store reports,
//! `FetchError` is what the fetcher reports about a single-node operation.
//! Fan-out operations return partial results instead of errors; these types
//! only surface on the targeted single-source path.

use shared_types::NodeId;
use thiserror::Error;

/// Errors reported by one node's object store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The named object does not exist at this source. Normal for a node
    /// that lags behind the stream.
    #[error("object not found: {object}")]
    NotFound { object: String },

    /// The source is unreachable or refused the request.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The source answered but the transfer failed.
    #[error("transfer failed: {0}")]
    Io(String),
}

/// Errors from a targeted fetch against one node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No source is registered for the requested node.
    #[error("no source registered for node {node_id}")]
    UnknownSource { node_id: NodeId },

    /// The source did not answer within the configured timeout.
    #[error("fetch from node {node_id} timed out")]
    Timeout { node_id: NodeId },

    /// The source reported an error.
    #[error("fetch from node {node_id} failed: {source}")]
    Source {
        node_id: NodeId,
        source: SourceError,
    },
}

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
