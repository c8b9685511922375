// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Run, SupportLibraryConfig, TokioCommand, ok};
use miette::{Context, IntoDiagnostic};
use std::path::{Path, PathBuf};

/// Run `make` in the support library's directory, then copy the built artifact into
/// `dest_dir`, where the probes link against it and load it at runtime. Returns the
/// copied artifact's path.
///
/// `make` inherits the console so its progress is visible.
///
/// # Errors
///
/// Returns an error if `make` fails, or the artifact cannot be copied.
pub async fn build_support_library(
    config: &SupportLibraryConfig,
    dest_dir: &Path,
) -> miette::Result<PathBuf> {
    tracing::info!(message = "Building support library", dir = ?config.make_dir);
    TokioCommand::new("make")
        .current_dir(&config.make_dir)
        .run_interactive()
        .await
        .wrap_err("make failed for the support library")?;

    let from = config.make_dir.join(&config.artifact);
    let to = dest_dir.join(&config.artifact);
    tokio::fs::copy(&from, &to)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not copy {from:?} to {to:?}"))?;

    tracing::info!(message = "Copied support library", to = ?to);
    ok!(to)
}
