// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

//! # Subtec L2 harness
//!
//! Black-box conformance tests for the subtitle rendering app (`subttxrend-app`). The
//! app is an opaque OS process; the only things this crate observes are whether it is
//! running and what it writes to its console log.
//!
//! ## How a scenario runs
//!
//! 1. [`LogCheckpoint`] records the current end of the shared log. Nothing before this
//!    offset is ever looked at again.
//! 2. [`ProcessSupervisor`] makes sure the app is up, restarting it (and resetting the
//!    checkpoint to `0`, since the log is truncated) if any of its processes are gone.
//! 3. A [`ProbeExecutor`] compiles the scenario's single native probe source and runs it.
//!    The probe drives the app through its real socket protocol.
//! 4. [`wait_for_marker`] blocks until the scenario's completion marker shows up, then the
//!    log is archived next to the scenario.
//! 5. Each [`Verification`] step scans the archived log from the checkpoint:
//!    - [`Verification::Sequence`] - ordered substrings, not necessarily contiguous.
//!    - [`Verification::Between`] - unordered substrings inside a marker-bounded span.
//!    - [`Verification::Absent`] - none of a set of substrings anywhere.
//!
//! All line-based scans share [`ChunkedLineReader`], which reads the log in bounded
//! chunks and reassembles lines that straddle chunk boundaries.
//!
//! ## Module structure
//!
//! - `log_scan/` - checkpoint, chunked reader, and the verification modes.
//! - `supervisor/` - `pgrep`/`kill` process table and the app lifecycle.
//! - `probe/` - probe source discovery, compile and run, support library build.
//! - `scenario/` - manifests, discovery, the orchestrator, and the results report.
//! - `config/` - [`HarnessConfig`] loaded from `l2_harness.json5`.
//! - `log/` - `tracing` setup for the harness's own log.
//! - `common/` - the [`command!`] macro, [`Deadline`], and the miette report hook.

// Attach all modules.
pub mod cli_arg;
pub mod common;
pub mod config;
pub mod log;
pub mod log_scan;
pub mod probe;
pub mod scenario;
pub mod supervisor;
pub mod ui_str;

// Re-export commonly used items.
pub use cli_arg::*;
pub use common::*;
pub use config::*;
pub use log::*;
pub use log_scan::*;
pub use probe::*;
pub use scenario::*;
pub use supervisor::*;
