// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fs::File,
          io::{Seek, SeekFrom},
          path::{Path, PathBuf}};

/// Returns the current end-of-file byte offset of `path`, or `0` if the file does not
/// exist yet. A missing log just means nothing has been written, it is not an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be opened or seeked.
pub fn checkpoint(path: impl AsRef<Path>) -> std::io::Result<u64> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(mut file) => file.seek(SeekFrom::End(0)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err),
    }
}

/// Byte offset into the shared app log. Everything before [`offset`](Self::offset) was
/// already validated by an earlier scenario and must be ignored.
///
/// The app is not restarted between scenarios, so the log keeps growing for the whole
/// run. This value is threaded through the orchestrator (not kept in a global) and is
/// only ever moved two ways:
/// - [`advance_to_end`](Self::advance_to_end), once per scenario, right before the
///   scenario's stimulus. It never moves backwards.
/// - [`reset`](Self::reset), when the app is restarted and its log truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCheckpoint {
    path: PathBuf,
    offset: u64,
}

impl LogCheckpoint {
    /// A checkpoint at offset `0`, for a log that may not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
        }
    }

    /// A checkpoint at an explicit offset. Mostly useful for tests with synthetic logs.
    pub fn at(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    #[must_use]
    pub fn offset(&self) -> u64 { self.offset }

    /// Move the checkpoint to the current end of the log and return the new offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be opened or seeked.
    pub fn advance_to_end(&mut self) -> std::io::Result<u64> {
        let end = checkpoint(&self.path)?;
        if end < self.offset {
            tracing::warn!(
                message = "log shrank without a restart, keeping checkpoint",
                path = ?self.path,
                offset = self.offset,
                end
            );
        } else {
            self.offset = end;
        }
        tracing::debug!(message = "checkpoint", path = ?self.path, offset = self.offset);
        Ok(self.offset)
    }

    /// A fresh log was just created, so reading from the start is valid again.
    pub fn reset(&mut self) { self.offset = 0; }
}
