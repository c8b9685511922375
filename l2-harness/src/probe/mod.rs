// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Per-scenario native probes: find the source, compile it, run it.

// Attach sources.
pub mod probe_build;
pub mod probe_error;
pub mod probe_executor;
pub mod probe_source;
pub mod support_lib;

// Re-export.
pub use probe_build::*;
pub use probe_error::*;
pub use probe_executor::*;
pub use probe_source::*;
pub use support_lib::*;
