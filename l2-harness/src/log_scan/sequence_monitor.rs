// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ChunkedLineReader, PollPolicy, VerifyFailure, VerifyOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered list of literal substrings that must appear in the log in this order, each
/// on a later line than the previous one. Lines in between are ignored. Duplicates are
/// allowed and are consumed one line each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedSequence(pub Vec<String>);

impl ExpectedSequence {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn push(&mut self, item: impl Into<String>) { self.0.push(item.into()); }
}

/// Consume `lines` and return how many entries of `expected` were matched in order.
///
/// A line advances the cursor by at most one entry, even if it also contains the entries
/// after the current one. There is no backtracking and no skipping ahead, so a log where
/// two expected strings share a line, or appear out of order, does not satisfy the
/// sequence. Stops reading as soon as every entry has matched.
pub fn match_sequence<L: AsRef<str>>(
    lines: impl IntoIterator<Item = L>,
    expected: &ExpectedSequence,
) -> usize {
    let mut cursor = 0;
    for line in lines {
        let Some(wanted) = expected.0.get(cursor) else {
            break;
        };
        if line.as_ref().contains(wanted.as_str()) {
            cursor += 1;
            if cursor == expected.len() {
                break;
            }
        }
    }
    cursor
}

/// One pass over the log from `offset` to end of file.
///
/// An empty `expected` always passes. A log that cannot be opened fails with
/// [`VerifyFailure::LogUnreadable`].
pub fn check_sequence(
    path: impl AsRef<Path>,
    offset: u64,
    expected: &ExpectedSequence,
    chunk_size: usize,
) -> VerifyOutcome {
    let path = path.as_ref();
    let reader = ChunkedLineReader::open(path, offset, chunk_size)
        .map_err(|err| VerifyFailure::unreadable(path, &err))?;

    let mut read_error = None;
    let lines = reader.map_while(|line| match line {
        Ok(line) => Some(line),
        Err(err) => {
            read_error = Some(err);
            None
        }
    });
    let matched = match_sequence(lines, expected);

    if matched == expected.len() {
        return Ok(());
    }
    if let Some(err) = read_error {
        return Err(VerifyFailure::unreadable(path, &err));
    }
    tracing::debug!(
        message = "sequence incomplete",
        missing = %expected.0[matched],
        matched,
        total = expected.len()
    );
    Err(VerifyFailure::SequenceIncomplete {
        missing: expected.0[matched].clone(),
        index: matched,
        total: expected.len(),
    })
}

/// Re-run [`check_sequence`] from the same `offset` until it passes or `policy` times
/// out. Each attempt is an independent scan; nothing carries over between attempts.
///
/// Use [`PollPolicy::once`] against a log that is already a stable snapshot (eg: the
/// per-scenario archived copy), and a real timeout against the live, growing log.
pub async fn await_sequence(
    path: impl AsRef<Path>,
    offset: u64,
    expected: &ExpectedSequence,
    policy: PollPolicy,
    chunk_size: usize,
) -> VerifyOutcome {
    let path = path.as_ref();
    policy
        .poll(|| check_sequence(path, offset, expected, chunk_size))
        .await
}
