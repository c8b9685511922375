// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ChunkedLineReader, VerifyFailure, VerifyOutcome};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, path::Path};

/// Literal substrings that must not occur anywhere in the scanned log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForbiddenSet(pub Vec<String>);

impl ForbiddenSet {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(items.into_iter().map(Into::into).collect())
    }

    /// Every member of the set that `line` contains.
    pub fn hits<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.0.iter().filter(move |it| line.contains(it.as_str()))
    }
}

/// Scan from `offset` to end of file and pass only if no line contains any member of
/// `forbidden`.
///
/// Every line is checked against every forbidden string and the hits are accumulated
/// for the whole scan, so a failure lists all of the violations at once. There is no
/// early exit: absence can only be shown once the window of interest is over, which is
/// why callers wait for the scenario's completion marker first.
pub fn verify_absent(
    path: impl AsRef<Path>,
    offset: u64,
    forbidden: &ForbiddenSet,
    chunk_size: usize,
) -> VerifyOutcome {
    let path = path.as_ref();
    let reader = ChunkedLineReader::open(path, offset, chunk_size)
        .map_err(|err| VerifyFailure::unreadable(path, &err))?;

    let mut found = BTreeSet::new();
    for line in reader {
        let line = line.map_err(|err| VerifyFailure::unreadable(path, &err))?;
        found.extend(forbidden.hits(&line).cloned());
    }

    if found.is_empty() {
        tracing::debug!(message = "none of the unwanted strings found", path = ?path);
        Ok(())
    } else {
        for it in &found {
            tracing::debug!(message = "unwanted string found", unwanted = %it);
        }
        Err(VerifyFailure::ForbiddenFound { found })
    }
}
