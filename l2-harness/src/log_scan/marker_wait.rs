// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{PollPolicy, VerifyFailure, read_remaining};
use std::path::Path;

/// Block until `marker` appears anywhere in the log after `offset`, re-reading the log
/// every `policy.interval`, for at most `policy.timeout`.
///
/// This is a plain substring search over the whole remainder, not a line scan. It serves
/// two waits:
/// - the app's readiness marker after a restart (from offset `0`), and
/// - a scenario's completion marker (from the scenario's checkpoint).
///
/// A log that does not exist yet counts as "not yet" (the app may still be creating it).
/// Any other read error ends the wait immediately with `false`.
pub async fn wait_for_marker(
    path: impl AsRef<Path>,
    offset: u64,
    marker: &str,
    policy: PollPolicy,
) -> bool {
    let path = path.as_ref();

    // Ok(..) stops polling with a final answer, Err(()) means "not yet".
    let outcome: Result<Result<(), VerifyFailure>, ()> = policy
        .poll(|| match read_remaining(path, offset) {
            Ok(content) if content.contains(marker) => Ok(Ok(())),
            Ok(_) => Err(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(()),
            Err(err) => Ok(Err(VerifyFailure::unreadable(path, &err))),
        })
        .await;

    match outcome {
        Ok(Ok(())) => {
            tracing::debug!(message = "Found expected string", marker);
            true
        }
        Ok(Err(failure)) => {
            tracing::error!(message = "Error reading log file", failure = %failure);
            false
        }
        Err(()) => {
            tracing::warn!(
                message = "Timeout: marker not found in log",
                marker,
                timeout = ?policy.timeout
            );
            false
        }
    }
}
