// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{VerifyFailure, VerifyOutcome, read_remaining};
use std::{ops::Range, path::Path};

/// Byte range `[start, end)` of log text bounded by marker strings.
///
/// - One marker: from the end of its first occurrence to the start of its last one.
/// - Two markers: from the end of the first occurrence of `marker1` to the start of the
///   last occurrence of `marker2`.
///
/// The span is only valid when `start < end`. An end marker that only occurs before the
/// start marker is a scenario design error and fails with
/// [`VerifyFailure::InvalidSpan`]; it is never treated as an empty span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    pub start: usize,
    pub end: usize,
}

impl MarkerSpan {
    /// Locate the span in `content`. An empty `marker2` selects the single marker form.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyFailure`] when a marker is missing, the single marker occurs
    /// fewer than two times, or the resulting span is empty or inverted.
    pub fn locate(content: &str, marker1: &str, marker2: &str) -> Result<Self, VerifyFailure> {
        let starts = find_all(content, marker1);
        let Some(&first) = starts.first() else {
            return Err(VerifyFailure::MarkerNotFound {
                marker: marker1.to_string(),
            });
        };
        let start = first + marker1.len();

        let end = if marker2.is_empty() {
            if starts.len() < 2 {
                return Err(VerifyFailure::TooFewMarkerOccurrences {
                    marker: marker1.to_string(),
                    found: starts.len(),
                });
            }
            starts[starts.len() - 1]
        } else {
            let ends = find_all(content, marker2);
            let Some(&last) = ends.last() else {
                return Err(VerifyFailure::MarkerNotFound {
                    marker: marker2.to_string(),
                });
            };
            last
        };

        if start >= end {
            return Err(VerifyFailure::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> { self.start..self.end }
}

/// Byte positions of every non-overlapping occurrence of `needle`, scanning forward.
fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    haystack.match_indices(needle).map(|(index, _)| index).collect()
}

/// Check that every string in `expected` appears on some line between the markers. The
/// order is not checked, since the app logs some attribute groups in a different order
/// from run to run.
///
/// The whole remainder of the log from `offset` is read at once, the window being a
/// single scenario's output.
pub fn verify_between(
    path: impl AsRef<Path>,
    offset: u64,
    expected: &[String],
    marker1: &str,
    marker2: &str,
) -> VerifyOutcome {
    let path = path.as_ref();
    let content =
        read_remaining(path, offset).map_err(|err| VerifyFailure::unreadable(path, &err))?;
    verify_between_in(&content, expected, marker1, marker2)
}

/// Same as [`verify_between`], over text already in memory.
pub fn verify_between_in(
    content: &str,
    expected: &[String],
    marker1: &str,
    marker2: &str,
) -> VerifyOutcome {
    let span = MarkerSpan::locate(content, marker1, marker2).inspect_err(|failure| {
        tracing::debug!(message = "marker span not usable", failure = %failure);
    })?;
    let lines: Vec<&str> = content[span.range()].lines().collect();

    match expected
        .iter()
        .find(|wanted| !lines.iter().any(|line| line.contains(wanted.as_str())))
    {
        Some(missing) => Err(VerifyFailure::MissingInSpan {
            missing: missing.clone(),
        }),
        None => Ok(()),
    }
}
