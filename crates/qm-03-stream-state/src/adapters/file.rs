//! File-backed cursor store.
//!
//! Persists all cursor rows in a single checksummed binary file inside the
//! state directory. Writes go through a temp file that is synced and then
//! renamed over the live file, so a crash mid-write leaves the previous
//! record intact. An advisory lock on the directory enforces the
//! single-writer constraint: a second mirror process pointed at the same
//! state directory fails at startup instead of silently interleaving
//! cursor writes.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::RwLock;
use tracing::info;

use shared_types::{FileHash, StreamCursor, StreamFileName, StreamKind};

use crate::domain::errors::{StoreError, StoreResult};
use crate::ports::outbound::CursorStore;

/// Name of the cursor record inside the state directory.
const STORE_FILE: &str = "cursors.bin";

/// Name of the advisory lock file.
const LOCK_FILE: &str = "LOCK";

/// Length of the CRC32 trailer guarding the record payload.
const CHECKSUM_LEN: usize = 4;

/// Durable cursor store backed by one file per state directory.
pub struct FileCursorStore {
    cache: RwLock<HashMap<StreamKind, StreamCursor>>,
    path: PathBuf,
    /// Held open for the lifetime of the store; dropping releases the lock.
    _lock: File,
}

impl FileCursorStore {
    /// Opens (or creates) the store in `state_dir`, acquiring its exclusive
    /// lock and loading any existing cursor record.
    pub fn open(state_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(state_dir).map_err(|e| StoreError::Io(e.to_string()))?;

        let lock_path = state_dir.join(LOCK_FILE);
        let mut lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        lock.try_lock_exclusive().map_err(|_| StoreError::Locked {
            path: lock_path.display().to_string(),
        })?;
        writeln!(lock, "{}", std::process::id()).map_err(|e| StoreError::Io(e.to_string()))?;
        lock.sync_all().map_err(|e| StoreError::Io(e.to_string()))?;

        let path = state_dir.join(STORE_FILE);
        let cursors = Self::load(&path)?;
        if !cursors.is_empty() {
            info!(
                path = %path.display(),
                streams = cursors.len(),
                "loaded existing cursor record"
            );
        }

        Ok(Self {
            cache: RwLock::new(cursors),
            path,
            _lock: lock,
        })
    }

    fn load(path: &Path) -> StoreResult<HashMap<StreamKind, StreamCursor>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        if bytes.len() < CHECKSUM_LEN {
            return Err(StoreError::Corrupt {
                reason: format!("record is {} bytes, shorter than its checksum", bytes.len()),
            });
        }

        let (trailer, payload) = (&bytes[..CHECKSUM_LEN], &bytes[CHECKSUM_LEN..]);
        let mut stored = [0u8; CHECKSUM_LEN];
        stored.copy_from_slice(trailer);
        let stored = u32::from_le_bytes(stored);
        let computed = crc32fast::hash(payload);
        if stored != computed {
            return Err(StoreError::Corrupt {
                reason: format!("checksum mismatch: stored {stored:08x}, computed {computed:08x}"),
            });
        }

        bincode::deserialize(payload).map_err(|e| StoreError::Corrupt {
            reason: format!("undecodable cursor record: {e}"),
        })
    }

    /// Serializes and atomically replaces the on-disk record.
    fn persist(&self, cursors: &HashMap<StreamKind, StreamCursor>) -> StoreResult<()> {
        let payload = bincode::serialize(cursors).map_err(|e| StoreError::Io(e.to_string()))?;
        let mut bytes = Vec::with_capacity(CHECKSUM_LEN + payload.len());
        bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        bytes.extend_from_slice(&payload);

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| StoreError::Io(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.sync_all().map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn get(&self, stream: StreamKind) -> StoreResult<StreamCursor> {
        Ok(self
            .cache
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
        let mut cache = self.cache.write();
        if let Some(current) = cache.get(&stream) {
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

        let mut next = cache.clone();
        next.insert(
            stream,
            StreamCursor {
                stream_kind: stream,
                last_accepted_file_name: Some(file_name),
                last_accepted_hash: hash,
            },
        );
        // The cache only reflects what the disk durably holds.
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }
}
