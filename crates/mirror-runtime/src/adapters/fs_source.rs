//! # Filesystem Object Source
//!
//! One node's object store, exposed as a directory tree:
//!
//! ```text
//! <root>/<node_id>/balance/bal_000001.qbf
//! <root>/<node_id>/balance/bal_000001.qbf_sig
//! <root>/<node_id>/record/rcd_000001.qrs
//! ```
//!
//! The mount is read-only from the mirror's point of view; nodes (or a
//! sync job) write into it on their own schedule. A missing stream
//! directory just means the node has not produced that stream yet.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use qm_02_stream_fetch::{ObjectSource, SourceError};
use shared_types::{NodeId, StreamFileName, StreamKind};

/// Object source over one node's directory.
#[derive(Debug, Clone)]
pub struct FsObjectSource {
    node_id: NodeId,
    node_root: PathBuf,
}

impl FsObjectSource {
    /// Source for `node_id` under the shared mount `root`.
    #[must_use]
    pub fn new(node_id: NodeId, root: &Path) -> Self {
        Self {
            node_id,
            node_root: root.join(node_id.to_string()),
        }
    }

    fn stream_dir(&self, kind: StreamKind) -> PathBuf {
        self.node_root.join(kind.as_str())
    }
}

#[async_trait]
impl ObjectSource for FsObjectSource {
    async fn list(
        &self,
        kind: StreamKind,
        after: Option<&StreamFileName>,
    ) -> Result<Vec<StreamFileName>, SourceError> {
        let dir = self.stream_dir(kind);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    node = %self.node_id,
                    dir = %dir.display(),
                    "stream directory absent, node has produced nothing yet"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(SourceError::Unavailable(err.to_string())),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| SourceError::Io(err.to_string()))?;
            let file_type = entry
                .file_type()
                .map_err(|err| SourceError::Io(err.to_string()))?;
            if !file_type.is_file() {
                continue;
            }
            // Non-UTF-8 names cannot be stream files; skip them.
            let Ok(raw) = entry.file_name().into_string() else {
                continue;
            };
            let name = StreamFileName::new(raw);
            if after.map_or(true, |boundary| &name > boundary) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn fetch(&self, kind: StreamKind, object_name: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.stream_dir(kind).join(object_name);
        std::fs::read(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound {
                object: object_name.to_string(),
            },
            _ => SourceError::Io(err.to_string()),
        })
    }

    fn node_id(&self) -> NodeId {
        self.node_id
    }
}
