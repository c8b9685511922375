// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Thin wrappers over `pgrep -f` and `kill -9`.
//!
//! Processes are looked up by a substring of their full command line, and no PID is kept
//! between calls. That matching is fuzzy: any unrelated process whose command line
//! contains the same substring (eg: an editor with `build.sh` open) is also reported as
//! running, and is also killed by [`kill_all`]. The scenario fixtures rely on this
//! behavior, so it is kept as is.

use crate::{Run, command};
use miette::IntoDiagnostic;

/// PIDs of every process whose command line contains `name`. `pgrep` exits with `1` when
/// nothing matches; that is an empty list, not an error.
///
/// # Errors
///
/// Returns an error if `pgrep` cannot be run, or fails for any reason other than "no
/// match".
pub async fn find_pids(name: &str) -> miette::Result<Vec<u32>> {
    let output = command!(
        program => "pgrep",
        args => "-f", name,
    )
    .output()
    .await
    .into_diagnostic()?;

    if !output.status.success() && output.status.code() != Some(1) {
        miette::bail!(
            "pgrep -f {name} failed with {status}: {stderr}",
            status = output.status,
            stderr = String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect())
}

/// `true` iff at least one process matches `name`. A lookup error counts as "not
/// running", so the caller restarts the app.
pub async fn is_running(name: &str) -> bool {
    match find_pids(name).await {
        Ok(pids) => !pids.is_empty(),
        Err(report) => {
            tracing::warn!(message = "Error finding process", name, report = %report);
            false
        }
    }
}

/// Send `SIGKILL` to every process matching `name` and return how many were signaled.
/// Zero matches is a no-op. A failed `kill` is logged and the rest are still attempted.
pub async fn kill_all(name: &str) -> usize {
    let pids = match find_pids(name).await {
        Ok(pids) => pids,
        Err(report) => {
            tracing::warn!(message = "Error finding process to kill", name, report = %report);
            return 0;
        }
    };

    let mut killed = 0;
    for pid in pids {
        tracing::info!(message = "Killing process", name, pid);
        match command!(program => "kill", args => "-9", pid.to_string()).run().await {
            Ok(_) => killed += 1,
            Err(report) => {
                tracing::warn!(message = "kill failed", name, pid, report = %report);
            }
        }
    }
    killed
}
