// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DisplayPreference, TracingConfig, WriterConfig, ok};
use std::path::Path;
use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, registry::LookupSpan};

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    };
}

/// Returns the layers for `tracing_config`: the level filter first, then a display
/// layer and a file layer if configured. Does not install anything.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<tracing_subscriber::Registry>>>> {
    let level_filter = tracing_config.get_level_filter();
    let writer_config = tracing_config.get_writer_config();

    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];
    return_it.push(Box::new(level_filter));

    if let Some(layer) = try_create_display_layer(level_filter, writer_config.clone()) {
        return_it.push(layer);
    }
    if let Some(layer) = try_create_file_layer(level_filter, writer_config)? {
        return_it.push(layer);
    }

    ok!(return_it)
}

pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> Option<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();
    match writer_config {
        WriterConfig::DisplayAndFile(display_pref, _) | WriterConfig::Display(display_pref) => {
            match display_pref {
                DisplayPreference::Stdout => Some(Box::new(
                    fmt_layer
                        .with_writer(std::io::stdout)
                        .with_filter(level_filter),
                )),
                DisplayPreference::Stderr => Some(Box::new(
                    fmt_layer
                        .with_writer(std::io::stderr)
                        .with_filter(level_filter),
                )),
            }
        }
        WriterConfig::None | WriterConfig::File(_) => None,
    }
}

/// The file is never rolled over; each run names its own file.
///
/// # Errors
///
/// Returns an error if the path has no file name.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let (WriterConfig::DisplayAndFile(_, path) | WriterConfig::File(path)) = writer_config
    else {
        return Ok(None);
    };

    let Some(file_name) = path.file_name() else {
        miette::bail!("Can't use {path:?} as a log file, it has no file name");
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let appender = tracing_appender::rolling::never(parent, file_name);

    let layer: Box<DynLayer<S>> = Box::new(
        create_fmt!()
            .with_ansi(false)
            .with_writer(appender)
            .with_filter(level_filter),
    );
    ok!(Some(layer))
}

/// Install `options` as the global subscriber. [`LevelFilter::OFF`] (the default when
/// only a writer is given) skips installation entirely, so logging stays disabled.
///
/// # Errors
///
/// Returns an error if the log file cannot be created, or a global subscriber is
/// already set.
pub fn try_initialize_logging_global(options: impl Into<TracingConfig>) -> miette::Result<()> {
    let it: TracingConfig = options.into();
    if it.get_level_filter() == LevelFilter::OFF {
        return ok!();
    }
    it.install_global()
}

/// Like [`try_initialize_logging_global`] but only for the current thread, for as long
/// as the returned guard lives.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<dispatcher::DefaultGuard>> {
    let it: TracingConfig = options.into();
    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(None);
    }
    it.install_thread_local().map(Some)
}

/// `run_l2_subtec_<YYYYmmdd_HHMMSS>.log`, for the harness's own log with
/// `--enable-logging`.
#[must_use]
pub fn harness_log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("run_l2_subtec_{}.log", now.format("%Y%m%d_%H%M%S"))
}
