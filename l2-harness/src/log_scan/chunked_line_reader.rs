// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::VecDeque,
          fs::File,
          io::{ErrorKind, Read, Seek, SeekFrom},
          path::Path};

/// 512 KiB. The shared log grows with every scenario, so it is never loaded whole by the
/// line-based scans.
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

/// Lazily yields the complete lines of a file, starting at a byte offset, reading at
/// most `chunk_size` bytes at a time.
///
/// - Lines are split on `\n`. The terminator (and a trailing `\r`, if any) is stripped.
/// - The last line of a chunk is usually cut short. Its bytes are carried over and
///   prefixed onto the next chunk, so a line spanning a chunk boundary is yielded exactly
///   once, whole. Splitting happens on raw bytes, so a multi-byte UTF-8 character cut by
///   a chunk boundary is reassembled before decoding.
/// - At end of file, a final line with no trailing newline is still yielded.
/// - Decoding is lossy. Malformed bytes in the app's output become `U+FFFD` instead of
///   aborting the scan.
///
/// Each reader owns its file handle and buffers. Two readers over the same file share
/// nothing.
#[derive(Debug)]
pub struct ChunkedLineReader {
    /// `None` once end of file (or a read error) has been reached.
    file: Option<File>,
    chunk: Vec<u8>,
    carry: Vec<u8>,
    ready: VecDeque<String>,
}

impl ChunkedLineReader {
    /// Open `path` and position the reader at byte `offset`. An offset past the end of
    /// the file is valid and yields no lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or seeked.
    pub fn open(
        path: impl AsRef<Path>,
        offset: u64,
        chunk_size: usize,
    ) -> std::io::Result<Self> {
        let mut file = File::open(path.as_ref())?;
        file.seek(SeekFrom::Start(offset))?;
        Ok(Self {
            file: Some(file),
            chunk: vec![0; chunk_size.max(1)],
            carry: Vec::new(),
            ready: VecDeque::new(),
        })
    }

    /// Split the freshly read `n` bytes into complete lines, keeping the unterminated
    /// tail in `carry`.
    fn absorb(&mut self, n: usize) {
        let Self {
            chunk,
            carry,
            ready,
            ..
        } = self;
        let mut pieces = chunk[..n].split(|&byte| byte == b'\n').peekable();
        while let Some(piece) = pieces.next() {
            carry.extend_from_slice(piece);
            if pieces.peek().is_some() {
                ready.push_back(decode_line(carry));
                carry.clear();
            }
        }
    }
}

impl Iterator for ChunkedLineReader {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }

            let file = self.file.as_mut()?;
            match file.read(&mut self.chunk) {
                Ok(0) => {
                    self.file = None;
                    if self.carry.is_empty() {
                        return None;
                    }
                    let last = decode_line(&self.carry);
                    self.carry.clear();
                    return Some(Ok(last));
                }
                Ok(n) => self.absorb(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    self.file = None;
                    return Some(Err(err));
                }
            }
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Read everything from `offset` to the end of `path` in one go, decoding lossily.
///
/// Used where the scan needs byte positions across line boundaries (marker spans) or a
/// plain substring search over the whole remainder (marker waits). Those windows are
/// one scenario's worth of log, not the whole file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, seeked, or read.
pub fn read_remaining(path: impl AsRef<Path>, offset: u64) -> std::io::Result<String> {
    let mut file = File::open(path.as_ref())?;
    file.seek(SeekFrom::Start(offset))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
