// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod discovery;
pub mod manifest;
pub mod orchestrator;
pub mod report;

// Re-export.
pub use discovery::*;
pub use manifest::*;
pub use orchestrator::*;
pub use report::*;
