// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::VerifyFailure;
use regex::Regex;
use std::{fs::File,
          io::{Read, Seek, SeekFrom},
          path::Path,
          sync::LazyLock};

static LINE_RECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[WebvttEngine::LineBuilder\] getOutputLines - line added rect:rect:\[(\d+);(\d+)\]\[(\d+)x(\d+)\] position:",
    )
    .expect("Invalid line rect regex")
});

/// Derive the pixel font size the app should pick for a WebVTT cue, from the first line
/// rect the app logs after `offset`, the same way the app's WebVTT converter does.
///
/// Only the first `chunk_size` bytes after `offset` are searched: the rect line shows up
/// within the first few hundred lines of a scenario's output. The display height is
/// `y + height` of that rect, and the result is
/// `trunc(display_height / 100 * font_height / 100)`.
///
/// # Errors
///
/// - [`VerifyFailure::LogUnreadable`] if the log cannot be read.
/// - [`VerifyFailure::FontRectNotFound`] if no rect line is in the window.
pub fn calculate_webvtt_font_size(
    path: impl AsRef<Path>,
    offset: u64,
    font_height: u32,
    chunk_size: usize,
) -> Result<u32, VerifyFailure> {
    let path = path.as_ref();
    let window = read_window(path, offset, chunk_size)
        .map_err(|err| VerifyFailure::unreadable(path, &err))?;

    let captures = LINE_RECT
        .captures(&window)
        .ok_or(VerifyFailure::FontRectNotFound)?;

    let number = |index: usize| -> Result<f64, VerifyFailure> {
        captures
            .get(index)
            .and_then(|it| it.as_str().parse::<u32>().ok())
            .map(f64::from)
            .ok_or(VerifyFailure::FontRectNotFound)
    };
    let display_height = number(2)? + number(4)?;
    let size = webvtt_font_size(display_height, font_height);

    tracing::debug!(
        message = "Calculated font size",
        size,
        font_height,
        display_height
    );
    Ok(size)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn webvtt_font_size(display_height: f64, font_height: u32) -> u32 {
    let hundredths = f64::from(font_height) / 100.0;
    ((display_height / 100.0) * hundredths) as u32
}

fn read_window(path: &Path, offset: u64, chunk_size: usize) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut bytes = Vec::with_capacity(chunk_size);
    file.take(chunk_size as u64).read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
