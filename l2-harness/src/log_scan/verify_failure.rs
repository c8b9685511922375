// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::BTreeSet, path::PathBuf};

/// Result of a single verification call. Verification never panics and never returns a
/// [`miette::Report`]; a failure is an ordinary value that names exactly what was wrong,
/// so the scenario that asked for the check can report it as its own failure.
///
/// When only a yes/no answer is needed, use [`Result::is_ok`].
pub type VerifyOutcome = Result<(), VerifyFailure>;

/// Why a verification did not pass.
///
/// | Variant                     | Produced by                         |
/// | :-------------------------- | :---------------------------------- |
/// | [`LogUnreadable`]           | every mode                          |
/// | [`SequenceIncomplete`]      | [`check_sequence`], [`await_sequence`] |
/// | [`MarkerNotFound`]          | [`verify_between`]                  |
/// | [`TooFewMarkerOccurrences`] | [`verify_between`] (single marker)  |
/// | [`InvalidSpan`]             | [`verify_between`]                  |
/// | [`MissingInSpan`]           | [`verify_between`]                  |
/// | [`ForbiddenFound`]          | [`verify_absent`]                   |
/// | [`FontRectNotFound`]        | [`calculate_webvtt_font_size`]      |
///
/// [`LogUnreadable`]: Self::LogUnreadable
/// [`SequenceIncomplete`]: Self::SequenceIncomplete
/// [`MarkerNotFound`]: Self::MarkerNotFound
/// [`TooFewMarkerOccurrences`]: Self::TooFewMarkerOccurrences
/// [`InvalidSpan`]: Self::InvalidSpan
/// [`MissingInSpan`]: Self::MissingInSpan
/// [`ForbiddenFound`]: Self::ForbiddenFound
/// [`FontRectNotFound`]: Self::FontRectNotFound
/// [`check_sequence`]: crate::check_sequence
/// [`await_sequence`]: crate::await_sequence
/// [`verify_between`]: crate::verify_between
/// [`verify_absent`]: crate::verify_absent
/// [`calculate_webvtt_font_size`]: crate::calculate_webvtt_font_size
#[derive(Debug, thiserror::Error, miette::Diagnostic, PartialEq, Eq)]
pub enum VerifyFailure {
    #[error("Could not read log file {path:?}: {reason}")]
    #[diagnostic(code(subtec_l2::verify::log_unreadable))]
    LogUnreadable { path: PathBuf, reason: String },

    #[error(
        "String \"{missing}\" is not found in the log (expected entry {index} of {total})"
    )]
    #[diagnostic(code(subtec_l2::verify::sequence_incomplete))]
    SequenceIncomplete {
        missing: String,
        index: usize,
        total: usize,
    },

    #[error("\"{marker}\" found number of times : 0")]
    #[diagnostic(code(subtec_l2::verify::marker_not_found))]
    MarkerNotFound { marker: String },

    #[error("\"{marker}\" found number of times : {found}, need at least 2")]
    #[diagnostic(code(subtec_l2::verify::too_few_marker_occurrences))]
    TooFewMarkerOccurrences { marker: String, found: usize },

    #[error("start_index {start} is not before end_index {end}")]
    #[diagnostic(
        code(subtec_l2::verify::invalid_span),
        help("The end marker's last occurrence precedes the start marker's first one")
    )]
    InvalidSpan { start: usize, end: usize },

    #[error("\"{missing}\" is not found between the markers")]
    #[diagnostic(code(subtec_l2::verify::missing_in_span))]
    MissingInSpan { missing: String },

    #[error("Unwanted strings found in the log: {found:?}")]
    #[diagnostic(code(subtec_l2::verify::forbidden_found))]
    ForbiddenFound { found: BTreeSet<String> },

    #[error("No WebVTT line rect found in the log to derive the font size from")]
    #[diagnostic(code(subtec_l2::verify::font_rect_not_found))]
    FontRectNotFound,
}

impl VerifyFailure {
    pub fn unreadable(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::LogUnreadable {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
