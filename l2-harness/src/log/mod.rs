// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The harness's own `tracing` output, to the console and optionally a file.

// Attach sources.
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
