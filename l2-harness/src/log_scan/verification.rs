// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ExpectedSequence, ForbiddenSet, VerifyOutcome, check_sequence, verify_absent,
            verify_between};
use std::path::Path;

/// The three ways a scenario's log can be checked. All of them scan from a checkpoint
/// offset, and the two line-based ones share [`ChunkedLineReader`].
///
/// [`ChunkedLineReader`]: crate::ChunkedLineReader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Ordered, not necessarily contiguous. See [`check_sequence`].
    Sequence(ExpectedSequence),
    /// Unordered, inside a marker-bounded span. See [`verify_between`].
    Between {
        expected: Vec<String>,
        marker1: String,
        marker2: String,
    },
    /// None of the set anywhere. See [`verify_absent`].
    Absent(ForbiddenSet),
}

impl Verification {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Between { .. } => "between",
            Self::Absent(_) => "absent",
        }
    }

    /// Run this check once over `path` from `offset`.
    pub fn verify(&self, path: impl AsRef<Path>, offset: u64, chunk_size: usize) -> VerifyOutcome {
        let path = path.as_ref();
        let outcome = match self {
            Self::Sequence(expected) => check_sequence(path, offset, expected, chunk_size),
            Self::Between {
                expected,
                marker1,
                marker2,
            } => verify_between(path, offset, expected, marker1, marker2),
            Self::Absent(forbidden) => verify_absent(path, offset, forbidden, chunk_size),
        };
        tracing::debug!(
            message = "verification",
            kind = self.kind(),
            passed = outcome.is_ok(),
            offset
        );
        outcome
    }
}

#[cfg(test)]
mod tests_verification {
    use super::*;
    use crate::VerifyFailure;
    use pretty_assertions::assert_eq;

    const LOG: &str = "\
onPacketReceived packet=type:SUBTITLE_SELECTION
START
color:0xff0000
font:mono
START
onPacketReceived packet=type:UNMUTE
";

    #[test]
    fn test_each_mode_against_one_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, LOG).unwrap();

        let sequence = Verification::Sequence(ExpectedSequence::new([
            "SUBTITLE_SELECTION",
            "UNMUTE",
        ]));
        let between = Verification::Between {
            expected: vec!["font:mono".into(), "color:0xff0000".into()],
            marker1: "START".into(),
            marker2: String::new(),
        };
        let absent = Verification::Absent(ForbiddenSet::new(["type:MUTE", "crash"]));
        for it in [&sequence, &between, &absent] {
            assert_eq!(it.verify(&path, 0, 7), Ok(()), "{}", it.kind());
        }

        let absent = Verification::Absent(ForbiddenSet::new(["UNMUTE"]));
        assert!(matches!(
            absent.verify(&path, 0, 7),
            Err(VerifyFailure::ForbiddenFound { .. })
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Verification::Absent(ForbiddenSet::default()).kind(), "absent");
        assert_eq!(
            Verification::Sequence(ExpectedSequence::default()).kind(),
            "sequence"
        );
    }
}
