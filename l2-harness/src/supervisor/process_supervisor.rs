// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{AppConfig, PollPolicy, TokioCommand, is_running, kill_all, wait_for_marker};
use std::{fs::File,
          path::{Path, PathBuf},
          process::Stdio};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SupervisorError {
    #[error("Could not create app log {path:?}")]
    #[diagnostic(code(subtec_l2::supervisor::log_create))]
    LogCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not launch {command:?} in {dir:?}")]
    #[diagnostic(
        code(subtec_l2::supervisor::start_failed),
        help("Check `app.launch_dir` and `app.launch_command` in the harness config")
    )]
    StartFailed {
        command: Vec<String>,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("App did not log {marker:?} within {timeout_secs}s of starting")]
    #[diagnostic(
        code(subtec_l2::supervisor::not_ready),
        help("See the app log at {log_path:?}")
    )]
    NotReady {
        marker: String,
        timeout_secs: u64,
        log_path: PathBuf,
    },
}

/// What [`Supervise::ensure_running`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Every tracked process was up. The log was not touched.
    AlreadyRunning,
    /// The app was (re)started and its log truncated, so any checkpoint into the old log
    /// is stale and must go back to `0`.
    Restarted,
}

/// Lifecycle of the single app under test, as seen by the orchestrator.
pub trait Supervise {
    /// Make sure the app is up and ready.
    ///
    /// # Errors
    ///
    /// Returns a [`SupervisorError`] if a restart was needed and the app could not be
    /// launched or never logged its ready marker. That is fatal for the whole run.
    fn ensure_running(&mut self)
    -> impl Future<Output = Result<RunState, SupervisorError>>;

    /// Stop every tracked process. Called once, at the end of the run.
    fn cleanup(&mut self) -> impl Future<Output = ()>;
}

/// Supervises the app as a detached OS process whose merged stdout and stderr go to
/// `log_path`.
///
/// ```text
/// Unknown ──is_running──▶ Running ─────────────────────────────▶ (no-op)
///    │
///    └────▶ NotRunning ──kill_all, start──▶ Restarting ──ready marker──▶ Running
///                                               │
///                                               └──timeout──▶ NotReady (fatal)
/// ```
#[derive(Debug)]
pub struct ProcessSupervisor {
    app: AppConfig,
    log_path: PathBuf,
    ready_policy: PollPolicy,
}

impl ProcessSupervisor {
    #[must_use]
    pub fn new(app: AppConfig, log_path: impl Into<PathBuf>) -> Self {
        let ready_policy = app.ready_policy();
        Self {
            app,
            log_path: log_path.into(),
            ready_policy,
        }
    }

    /// Override the readiness wait, eg: to keep tests fast.
    #[must_use]
    pub fn with_ready_policy(mut self, policy: PollPolicy) -> Self {
        self.ready_policy = policy;
        self
    }

    #[must_use]
    pub fn log_path(&self) -> &Path { &self.log_path }

    /// `true` iff every tracked process name has at least one match.
    pub async fn all_running(&self) -> bool {
        for name in &self.app.process_names {
            if !is_running(name).await {
                tracing::info!(message = "Process not running", name = %name);
                return false;
            }
        }
        true
    }

    /// Truncate (or create) the log, then launch the app in the background with its
    /// stdout and stderr both appended to the log. Does not wait for readiness.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be created or the launch command cannot be
    /// spawned.
    pub fn start(&self) -> Result<(), SupervisorError> {
        let log_create = |source| SupervisorError::LogCreate {
            path: self.log_path.clone(),
            source,
        };
        let stdout = File::create(&self.log_path).map_err(log_create)?;
        let stderr = stdout.try_clone().map_err(log_create)?;

        let start_failed = |source| SupervisorError::StartFailed {
            command: self.app.launch_command.clone(),
            dir: self.app.launch_dir.clone(),
            source,
        };
        let Some((program, args)) = self.app.launch_command.split_first() else {
            return Err(start_failed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty launch command",
            )));
        };

        let child = TokioCommand::new(program)
            .args(args)
            .current_dir(&self.app.launch_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(start_failed)?;

        tracing::info!(
            message = "Started app",
            pid = ?child.id(),
            command = ?self.app.launch_command,
            log = ?self.log_path
        );
        Ok(())
    }
}

impl Supervise for ProcessSupervisor {
    async fn ensure_running(&mut self) -> Result<RunState, SupervisorError> {
        if self.all_running().await {
            return Ok(RunState::AlreadyRunning);
        }

        // Kill the survivors too, so the restart never leaves a half-running mix.
        for name in &self.app.process_names {
            kill_all(name).await;
        }
        self.start()?;

        let ready = wait_for_marker(
            &self.log_path,
            0,
            &self.app.ready_marker,
            self.ready_policy,
        )
        .await;

        if !ready {
            return Err(SupervisorError::NotReady {
                marker: self.app.ready_marker.clone(),
                timeout_secs: self.ready_policy.timeout.as_secs(),
                log_path: self.log_path.clone(),
            });
        }

        tracing::info!(message = "App is ready", marker = %self.app.ready_marker);
        Ok(RunState::Restarted)
    }

    async fn cleanup(&mut self) {
        tracing::info!(message = "cleanup: stopping app");
        for name in &self.app.process_names {
            kill_all(name).await;
        }
    }
}
