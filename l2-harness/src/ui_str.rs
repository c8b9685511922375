// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Console strings. The per-scenario lines keep the layout that log scrapers in CI
//! already expect: the case name left-justified to 50 columns, then the event.

use std::fmt::Display;

pub const CASE_NAME_WIDTH: usize = 50;

pub const MIETTE_FOOTER: &str =
    "Run with `--enable-logging` to keep a timestamped harness log next to the results.";

fn case_line(case_name: &str, event: impl Display) -> String {
    format!("{case_name:<width$} {event}", width = CASE_NAME_WIDTH)
}

#[must_use]
pub fn test_started(case_name: &str) -> String { case_line(case_name, "Test Started") }

#[must_use]
pub fn test_passed(case_name: &str) -> String { case_line(case_name, "Test Passed") }

#[must_use]
pub fn test_failed(case_name: &str, diagnostic: impl Display) -> String {
    case_line(case_name, format_args!("Test Failed: {diagnostic}"))
}

#[must_use]
pub fn no_scenarios_selected() -> &'static str { "No scenarios matched the selection." }

#[must_use]
pub fn run_summary(passed: usize, total: usize) -> String {
    format!("{passed} of {total} scenarios passed")
}
