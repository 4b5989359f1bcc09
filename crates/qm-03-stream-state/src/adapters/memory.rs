//! In-memory cursor store.
//!
//! Cursor state lives only as long as the process; every restart begins at
//! genesis and re-validates the whole stream. Useful for ephemeral mirrors
//! and as the store behind integration tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use shared_types::{FileHash, StreamCursor, StreamFileName, StreamKind};

use crate::domain::errors::{StoreError, StoreResult};
use crate::ports::outbound::CursorStore;

/// Volatile cursor store with the same monotonicity guard as the file-backed
/// adapter.
#[derive(Default)]
pub struct MemoryCursorStore {
    cursors: RwLock<HashMap<StreamKind, StreamCursor>>,
}

impl MemoryCursorStore {
    /// Empty store, all streams at genesis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn get(&self, stream: StreamKind) -> StoreResult<StreamCursor> {
        Ok(self
            .cursors
            .read()
            .get(&stream)
            .cloned()
            .unwrap_or_else(|| StreamCursor::genesis(stream)))
    }

    async fn advance(
        &self,
        stream: StreamKind,
        file_name: StreamFileName,
        hash: FileHash,
    ) -> StoreResult<()> {
        let mut cursors = self.cursors.write();
        if let Some(current) = cursors.get(&stream) {
            if let Some(current_name) = &current.last_accepted_file_name {
                if &file_name <= current_name {
                    return Err(StoreError::Regression {
                        stream,
                        current: current_name.as_str().to_string(),
                        attempted: file_name.as_str().to_string(),
                    });
                }
            }
        }
        cursors.insert(
            stream,
            StreamCursor {
                stream_kind: stream,
                last_accepted_file_name: Some(file_name),
                last_accepted_hash: hash,
            },
        );
        Ok(())
    }
}
