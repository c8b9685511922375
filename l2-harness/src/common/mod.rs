// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Shared utilities across the harness.

// Attach sources.
pub mod command_runner;
pub mod deadline;
pub mod decl_macros;
pub mod miette_setup_global_report_handler;

// Re-export.
pub use command_runner::*;
pub use deadline::*;
pub use miette_setup_global_report_handler::*;
