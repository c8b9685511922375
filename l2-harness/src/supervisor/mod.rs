// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The app under test is a singleton per run. These modules find it, kill it, and
//! (re)start it.

// Attach sources.
pub mod process_supervisor;
pub mod process_table;

// Re-export.
pub use process_supervisor::*;
pub use process_table::*;
