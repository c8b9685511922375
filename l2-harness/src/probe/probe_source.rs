// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ProbeError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find the one probe source file (by `extension`) directly inside `dir`.
/// Subdirectories (eg: the archived log folder) are not searched.
///
/// # Errors
///
/// - [`ProbeError::NoSource`] if there is none.
/// - [`ProbeError::MultipleSources`] if there is more than one.
/// - [`ProbeError::UnreadableDir`] if `dir` cannot be listed.
pub fn find_probe_source(dir: &Path, extension: &str) -> Result<PathBuf, ProbeError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| ProbeError::UnreadableDir {
            dir: dir.to_path_buf(),
            reason: err.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == extension)
        {
            found.push(path.to_path_buf());
        }
    }
    found.sort();

    match found.len() {
        0 => Err(ProbeError::NoSource {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        }),
        1 => Ok(found.remove(0)),
        _ => Err(ProbeError::MultipleSources {
            dir: dir.to_path_buf(),
            found,
        }),
    }
}
