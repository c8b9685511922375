// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

/// Everything that can go wrong between "this scenario has a probe" and "the probe ran
/// to completion". Each one fails only its own scenario.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ProbeError {
    #[error("No *.{extension} probe source in {dir:?}")]
    #[diagnostic(
        code(subtec_l2::probe::no_source),
        help("Each scenario directory needs exactly one probe source file")
    )]
    NoSource { dir: PathBuf, extension: String },

    #[error("{} probe sources in {dir:?}, expected exactly one: {found:?}", .found.len())]
    #[diagnostic(
        code(subtec_l2::probe::multiple_sources),
        help("Each scenario directory needs exactly one probe source file")
    )]
    MultipleSources { dir: PathBuf, found: Vec<PathBuf> },

    #[error("Could not list {dir:?}: {reason}")]
    #[diagnostic(code(subtec_l2::probe::unreadable_dir))]
    UnreadableDir { dir: PathBuf, reason: String },

    #[error("Could not remove stale probe binary {binary:?}")]
    #[diagnostic(code(subtec_l2::probe::stale_binary))]
    StaleBinary {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not launch {program:?}")]
    #[diagnostic(code(subtec_l2::probe::spawn))]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiling {source_file:?} failed ({status})\n{stderr}")]
    #[diagnostic(code(subtec_l2::probe::build_failed))]
    BuildFailed {
        source_file: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Probe binary {binary:?} does not exist")]
    #[diagnostic(code(subtec_l2::probe::binary_missing))]
    BinaryMissing { binary: PathBuf },

    #[error("Probe {binary:?} exited abnormally ({status})\n{stderr}")]
    #[diagnostic(code(subtec_l2::probe::run_failed))]
    RunFailed {
        binary: PathBuf,
        status: String,
        stderr: String,
    },
}
