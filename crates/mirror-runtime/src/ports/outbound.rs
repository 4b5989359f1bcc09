//! # Outbound Ports
//!
//! The registry is consulted once per cycle so membership changes and key
//! rotations land between cycles, never mid-file. The sink is invoked only
//! after a file is accepted and the cursor durably advanced.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{AcceptedFile, NodeIdentity, StreamKind};

use crate::errors::{RegistryError, SinkError};

/// Source of the current node membership - outbound port.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// The full current membership, with each node's signing key.
    ///
    /// Called once at the start of every polling cycle. The returned list
    /// is the sole source of `N` for quorum math in that cycle.
    async fn current_nodes(&self) -> Result<Vec<NodeIdentity>, RegistryError>;
}

/// Destination for accepted files - outbound port.
#[async_trait]
pub trait AcceptedSink: Send + Sync {
    /// Hand one accepted file downstream.
    ///
    /// Must be idempotent for the same filename: after a crash between
    /// cursor advance and delivery, the file may be delivered again.
    async fn deliver(&self, kind: StreamKind, file: &AcceptedFile) -> Result<(), SinkError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock node registry for tests.
///
/// Membership is swappable between calls to exercise joins, leaves, and
/// key rotation landing at cycle boundaries.
#[derive(Default)]
pub struct MockNodeRegistry {
    identities: Mutex<Vec<NodeIdentity>>,
    should_fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockNodeRegistry {
    /// A registry answering with `identities`.
    #[must_use]
    pub fn with_identities(identities: Vec<NodeIdentity>) -> Self {
        Self {
            identities: Mutex::new(identities),
            ..Default::default()
        }
    }

    /// Replace the membership answered from now on.
    pub fn set_identities(&self, identities: Vec<NodeIdentity>) {
        *self.identities.lock() = identities;
    }

    /// Make every call fail with `Unavailable`.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// How many times the membership was read.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeRegistry for MockNodeRegistry {
    async fn current_nodes(&self) -> Result<Vec<NodeIdentity>, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable(
                "injected registry failure".to_string(),
            ));
        }
        Ok(self.identities.lock().clone())
    }
}

/// Mock accepted-file sink for tests.
#[derive(Default)]
pub struct MockAcceptedSink {
    delivered: Mutex<Vec<(StreamKind, AcceptedFile)>>,
    should_fail: AtomicBool,
}

impl MockAcceptedSink {
    /// A sink that records deliveries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery fail.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Everything delivered so far, in order.
    #[must_use]
    pub fn delivered(&self) -> Vec<(StreamKind, AcceptedFile)> {
        self.delivered.lock().clone()
    }

    /// Delivered filenames only, in order.
    #[must_use]
    pub fn delivered_names(&self) -> Vec<String> {
        self.delivered
            .lock()
            .iter()
            .map(|(_, file)| file.file_name.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl AcceptedSink for MockAcceptedSink {
    async fn deliver(&self, kind: StreamKind, file: &AcceptedFile) -> Result<(), SinkError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SinkError::Io {
                file_name: file.file_name.as_str().to_string(),
                reason: "injected sink failure".to_string(),
            });
        }
        self.delivered.lock().push((kind, file.clone()));
        Ok(())
    }
}
