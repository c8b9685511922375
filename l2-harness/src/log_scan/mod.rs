// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Everything that reads the app's console log. Nothing in here writes to it.

// Attach sources.
pub mod absence_verifier;
pub mod chunked_line_reader;
pub mod font_size;
pub mod interval_verifier;
pub mod log_archive;
pub mod log_cursor;
pub mod marker_wait;
pub mod sequence_monitor;
pub mod verification;
pub mod verify_failure;

// Re-export.
pub use absence_verifier::*;
pub use chunked_line_reader::*;
pub use font_size::*;
pub use interval_verifier::*;
pub use log_archive::*;
pub use log_cursor::*;
pub use marker_wait::*;
pub use sequence_monitor::*;
pub use verification::*;
pub use verify_failure::*;
