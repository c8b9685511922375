// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DynLayer, ok, try_create_layers};
use miette::IntoDiagnostic;
use std::{ops::Add, path::PathBuf};
use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where the harness's own log goes, and how verbose it is. This is separate from the
/// app's console log, which the harness only ever reads.
///
/// Built from any of the pieces via `From`, and merged with `+`:
///
/// ```
/// use subtec_l2_harness::{DisplayPreference, TracingConfig, WriterConfig};
///
/// let config = TracingConfig::from(tracing_core::LevelFilter::INFO)
///     + DisplayPreference::Stdout.into()
///     + WriterConfig::File("run_l2_subtec.log".into()).into();
/// assert!(matches!(config.writer_config, WriterConfig::DisplayAndFile(..)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(PathBuf),
    DisplayAndFile(DisplayPreference, PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    /// Install as the process-wide subscriber. Can only happen once per process.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created, or a global subscriber is
    /// already set.
    pub fn install_global(self) -> miette::Result<()> {
        let layers: Vec<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_layers(self)?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .into_diagnostic()?;
        ok!()
    }

    /// Install for the current thread only, until the returned guard is dropped. Meant
    /// for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created.
    pub fn install_thread_local(self) -> miette::Result<dispatcher::DefaultGuard> {
        let layers: Vec<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_layers(self)?;
        ok!(tracing_subscriber::registry().with(layers).set_default())
    }
}

impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self {
        Self {
            level_filter,
            writer_config: WriterConfig::None,
        }
    }
}

impl From<tracing::Level> for TracingConfig {
    fn from(level: tracing::Level) -> Self { LevelFilter::from_level(level).into() }
}

impl From<DisplayPreference> for TracingConfig {
    fn from(preferred_display: DisplayPreference) -> Self {
        Self {
            level_filter: LevelFilter::OFF,
            writer_config: WriterConfig::Display(preferred_display),
        }
    }
}

impl From<WriterConfig> for TracingConfig {
    fn from(writer_config: WriterConfig) -> Self {
        Self {
            level_filter: LevelFilter::OFF,
            writer_config,
        }
    }
}

/// The more verbose level filter wins; writers merge per [`WriterConfig`]'s `+`.
impl Add<TracingConfig> for TracingConfig {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            level_filter: self.level_filter.max(rhs.level_filter),
            writer_config: self.writer_config + rhs.writer_config,
        }
    }
}

/// Display and file merge into `DisplayAndFile`. On a collision the `rhs` wins.
impl Add<WriterConfig> for WriterConfig {
    type Output = Self;

    fn add(self, rhs: WriterConfig) -> Self::Output {
        use WriterConfig::{Display, DisplayAndFile, File, None};

        match (self, rhs) {
            (None, it) | (it, None) => it,
            (Display(display), File(file)) | (File(file), Display(display)) => {
                DisplayAndFile(display, file)
            }
            (Display(_) | File(_) | DisplayAndFile(..), DisplayAndFile(display, file))
            | (DisplayAndFile(_, file), Display(display))
            | (DisplayAndFile(display, _), File(file)) => DisplayAndFile(display, file),
            (Display(_), Display(display)) => Display(display),
            (File(_), File(file)) => File(file),
        }
    }
}
