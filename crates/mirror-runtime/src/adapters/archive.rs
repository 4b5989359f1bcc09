//! # Archive Sink
//!
//! Writes each accepted file under `<data_dir>/<stream_kind>/<file_name>`.
//! Writes go through a temp file and a rename, so a crash mid-write never
//! leaves a torn file under the final name, and re-delivering the same
//! filename after a crash simply overwrites it with identical bytes.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use shared_types::{AcceptedFile, StreamKind};

use crate::errors::SinkError;
use crate::ports::outbound::AcceptedSink;

/// Accepted-file sink writing into a local archive directory.
#[derive(Debug, Clone)]
pub struct ArchiveSink {
    data_dir: PathBuf,
}

impl ArchiveSink {
    /// Sink archiving under `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn io_error(file: &AcceptedFile, err: &std::io::Error) -> SinkError {
        SinkError::Io {
            file_name: file.file_name.as_str().to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl AcceptedSink for ArchiveSink {
    async fn deliver(&self, kind: StreamKind, file: &AcceptedFile) -> Result<(), SinkError> {
        let dir = self.data_dir.join(kind.as_str());
        fs::create_dir_all(&dir).map_err(|err| Self::io_error(file, &err))?;

        let final_path = dir.join(file.file_name.as_str());
        let temp_path = final_path.with_extension("part");
        let mut out = File::create(&temp_path).map_err(|err| Self::io_error(file, &err))?;
        out.write_all(&file.bytes)
            .map_err(|err| Self::io_error(file, &err))?;
        out.sync_all().map_err(|err| Self::io_error(file, &err))?;
        fs::rename(&temp_path, &final_path).map_err(|err| Self::io_error(file, &err))?;

        debug!(
            stream = kind.as_str(),
            file = %file.file_name,
            bytes = file.bytes.len(),
            "accepted file archived"
        );
        Ok(())
    }
}
