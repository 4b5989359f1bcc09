//! Outbound port: durable cursor storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use shared_types::{FileHash, StreamCursor, StreamFileName, StreamKind};

use crate::domain::errors::StoreResult;

// =============================================================================
// CURSOR STORE PORT
// =============================================================================

/// Durable keyed store holding one cursor row per stream kind.
///
/// `advance` is the only mutator and is called exactly once per accepted
/// file, after quorum resolution and chain validation both pass. One process
/// writes a given stream's cursor at a time; implementations enforce that
/// with whatever exclusion the backing medium offers.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Current cursor for the stream, or the genesis cursor if no file was
    /// ever accepted.
    async fn get(&self, stream: StreamKind) -> StoreResult<StreamCursor>;

    /// Durably records `file_name`/`hash` as the stream's last accepted
    /// file. Fails without touching state if the write cannot be made
    /// durable or if `file_name` does not sort after the current cursor.
    async fn advance(
        &self,
        stream: StreamKind,
        file_name: StreamFileName,
        hash: FileHash,
    ) -> StoreResult<()>;
}

// =============================================================================
// MOCK IMPLEMENTATION (for tests)
// =============================================================================

/// In-memory mock cursor store with failure injection.
///
/// Unlike [`crate::MemoryCursorStore`] this applies no monotonicity guard,
/// and advances can be made to fail mid-sequence to drive store-failure
/// paths in pipeline tests.
#[derive(Default)]
pub struct MockCursorStore {
    cursors: Mutex<HashMap<StreamKind, StreamCursor>>,
    fail_advances: AtomicBool,
    /// Every advance call in order, recorded before the failure switch is
    /// consulted.
    pub advance_log: Mutex<Vec<(StreamKind, StreamFileName)>>,
}

impl MockCursorStore {
    /// Empty store, all streams at genesis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `advance` calls fail with an I/O error.
    pub fn set_fail_advances(&self, fail: bool) {
        self.fail_advances.store(fail, Ordering::SeqCst);
    }

    /// Seed a cursor without going through `advance`.
    pub fn seed(&self, cursor: StreamCursor) {
        self.cursors.lock().insert(cursor.stream_kind, cursor);
    }

    /// Advance calls seen so far.
    #[must_use]
    pub fn advances(&self) -> Vec<(StreamKind, StreamFileName)> {
        self.advance_log.lock().clone()
    }
}

#[async_trait]
impl CursorStore for MockCursorStore {
    async fn get(&self, stream: StreamKind) -> StoreResult<StreamCursor> {
        Ok(self
            .cursors
            .lock()
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
        self.advance_log.lock().push((stream, file_name.clone()));
        if self.fail_advances.load(Ordering::SeqCst) {
            return Err(crate::domain::errors::StoreError::Io(
                "injected advance failure".to_string(),
            ));
        }
        self.cursors.lock().insert(
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
