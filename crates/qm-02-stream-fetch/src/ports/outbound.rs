//! # Outbound Ports
//!
//! One logical object source per consensus node. Implementations wrap
//! whatever storage the node exposes (a bucket mount, a local mirror
//! directory); the fetcher never cares which.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shared_types::{NodeId, StreamFileName, StreamKind};

use crate::domain::errors::SourceError;

/// Object store of one consensus node - outbound port.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// List object names of one stream kind, lexically after `after`.
    ///
    /// Sources may pre-filter on `after`; the fetcher re-filters anyway, so
    /// a source that returns extra names is merely wasteful, not wrong.
    async fn list(
        &self,
        kind: StreamKind,
        after: Option<&StreamFileName>,
    ) -> Result<Vec<StreamFileName>, SourceError>;

    /// Fetch one object's bytes. `object_name` is either a data object name
    /// or a signature object name.
    async fn fetch(&self, kind: StreamKind, object_name: &str) -> Result<Vec<u8>, SourceError>;

    /// The node this source belongs to.
    fn node_id(&self) -> NodeId;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Mock object source for tests.
///
/// Backed by an in-memory object map. Every fetched object name is recorded
/// so tests can assert what was (and was not) fetched.
#[derive(Clone, Default)]
pub struct MockObjectSource {
    /// Node identifier.
    pub id: NodeId,
    /// Objects by (kind, name).
    pub objects: HashMap<(StreamKind, String), Vec<u8>>,
    /// Fail every call with `Unavailable`.
    pub should_fail: bool,
    /// Delay before answering, to exercise fetch timeouts.
    pub delay: Option<Duration>,
    /// Names fetched from this source, in call order.
    pub fetch_log: Arc<Mutex<Vec<String>>>,
}

impl MockObjectSource {
    /// A healthy empty source for `node`.
    #[must_use]
    pub fn new(node: NodeId) -> Self {
        Self {
            id: node,
            ..Default::default()
        }
    }

    /// Store an object.
    pub fn insert(&mut self, kind: StreamKind, name: impl Into<String>, bytes: Vec<u8>) {
        self.objects.insert((kind, name.into()), bytes);
    }

    /// Names fetched from this source so far.
    #[must_use]
    pub fn fetched(&self) -> Vec<String> {
        self.fetch_log.lock().expect("fetch log poisoned").clone()
    }
}

#[async_trait]
impl ObjectSource for MockObjectSource {
    async fn list(
        &self,
        kind: StreamKind,
        after: Option<&StreamFileName>,
    ) -> Result<Vec<StreamFileName>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(SourceError::Unavailable("mock failure".to_string()));
        }
        let mut names: Vec<StreamFileName> = self
            .objects
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| StreamFileName::new(name.clone()))
            .filter(|name| after.map_or(true, |a| name > a))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn fetch(&self, kind: StreamKind, object_name: &str) -> Result<Vec<u8>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.fetch_log
            .lock()
            .expect("fetch log poisoned")
            .push(object_name.to_string());
        if self.should_fail {
            return Err(SourceError::Unavailable("mock failure".to_string()));
        }
        self.objects
            .get(&(kind, object_name.to_string()))
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                object: object_name.to_string(),
            })
    }

    fn node_id(&self) -> NodeId {
        self.id
    }
}
