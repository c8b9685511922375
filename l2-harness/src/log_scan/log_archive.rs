// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::Path;

/// Snapshot the shared app log to `to`, creating its parent directory if needed, and
/// return the number of bytes copied.
///
/// Verification runs against the snapshot, so output the app writes afterwards cannot
/// change a verdict halfway through a scenario's steps. The snapshot is a full copy, so
/// the scenario's checkpoint offset is still valid in it.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the copy fails.
pub fn copy_log(from: impl AsRef<Path>, to: impl AsRef<Path>) -> std::io::Result<u64> {
    let (from, to) = (from.as_ref(), to.as_ref());
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = std::fs::copy(from, to)?;
    tracing::debug!(message = "Copied log", from = ?from, to = ?to, bytes);
    Ok(bytes)
}

#[cfg(test)]
mod tests_log_archive {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_copy_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("subtec_console_common.log");
        std::fs::write(&log, "line one\nline two\n").unwrap();

        let copy = dir.path().join("TEST_1019").join("output_files").join("test_1019_subtec.log");
        assert_eq!(copy_log(&log, &copy).unwrap(), 18);
        assert_eq!(std::fs::read_to_string(&copy).unwrap(), "line one\nline two\n");

        std::fs::write(&log, "replaced\n").unwrap();
        assert_eq!(copy_log(&log, &copy).unwrap(), 9);
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(copy_log(dir.path().join("nope.log"), dir.path().join("out/x.log")).is_err());
    }
}
