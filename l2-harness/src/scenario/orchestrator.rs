// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{HarnessConfig, LogCheckpoint, ProbeBuild, ProbeError, ProbeExecutor, RunState,
            Scenario, ScenarioRecord, Supervise, SupervisorError, VerifyFailure, copy_log,
            find_probe_source, ui_str, wait_for_marker};
use std::path::PathBuf;

/// Why a single scenario did not pass. Everything except [`Self::Supervisor`] only fails
/// the scenario; the run moves on to the next one.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ScenarioError {
    #[error("Could not checkpoint the app log {path:?}")]
    #[diagnostic(code(subtec_l2::scenario::checkpoint))]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Probe(#[from] ProbeError),

    #[error("Could not copy the app log to {to:?}")]
    #[diagnostic(code(subtec_l2::scenario::archive))]
    Archive {
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Step {index} ({kind}) failed: {failure}")]
    #[diagnostic(code(subtec_l2::scenario::verify))]
    Verify {
        index: usize,
        kind: &'static str,
        failure: VerifyFailure,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// What [`Orchestrator::run_all`] produced: one record per scenario that ran, plus the
/// error that stopped the run early, if any.
#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<ScenarioRecord>,
    pub fatal: Option<SupervisorError>,
}

impl RunReport {
    /// `true` only if the run was not cut short and every record passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.fatal.is_none() && self.records.iter().all(ScenarioRecord::passed)
    }

    /// Drop the partial records if the run was cut short.
    ///
    /// # Errors
    ///
    /// Returns the [`SupervisorError`] that stopped the run.
    pub fn into_result(self) -> Result<Vec<ScenarioRecord>, SupervisorError> {
        match self.fatal {
            Some(fatal) => Err(fatal),
            None => Ok(self.records),
        }
    }
}

/// Runs scenarios one at a time against a single long lived app.
///
/// The orchestrator owns the [`LogCheckpoint`], so every scenario only ever sees log
/// output produced after it started. Per scenario:
///
/// 1. Advance the checkpoint to the end of the log.
/// 2. Find the probe source (exactly one per directory).
/// 3. [`Supervise::ensure_running`]. A restart resets the checkpoint to `0`.
/// 4. [`ProbeExecutor::build_and_run`].
/// 5. Wait for the completion marker. A timeout is logged, then verification runs
///    anyway and reports what is actually missing.
/// 6. Copy the log to `<scenario>/<output_dir_name>/<case>_subtec.log`.
/// 7. Run every manifest step against the copy. The first failure ends the scenario.
#[derive(Debug)]
pub struct Orchestrator<S: Supervise, E: ProbeExecutor> {
    config: HarnessConfig,
    checkpoint: LogCheckpoint,
    supervisor: S,
    executor: E,
}

impl<S: Supervise, E: ProbeExecutor> Orchestrator<S, E> {
    pub fn new(config: HarnessConfig, supervisor: S, executor: E) -> Self {
        let checkpoint = LogCheckpoint::new(&config.log_file);
        Self {
            config,
            checkpoint,
            supervisor,
            executor,
        }
    }

    #[must_use]
    pub fn checkpoint(&self) -> &LogCheckpoint { &self.checkpoint }

    #[must_use]
    pub fn supervisor(&self) -> &S { &self.supervisor }

    #[must_use]
    pub fn executor(&self) -> &E { &self.executor }

    /// Run `scenarios` in order and stop the app afterwards. Cleanup happens exactly once,
    /// whether the run finishes or is cut short.
    ///
    /// If the app cannot be (re)started, the remaining scenarios are not run. The report
    /// still carries the records of every scenario that finished before that.
    pub async fn run_all(&mut self, scenarios: &[Scenario]) -> RunReport {
        let mut report = RunReport::default();
        for scenario in scenarios {
            match self.run_scenario(scenario).await {
                Ok(record) => report.records.push(record),
                Err(fatal) => {
                    report.fatal = Some(fatal);
                    break;
                }
            }
        }
        self.supervisor.cleanup().await;
        report
    }

    /// Run one scenario and print its start and verdict lines.
    ///
    /// # Errors
    ///
    /// Only a [`SupervisorError`] escapes, every other problem becomes a failed record.
    pub async fn run_scenario(
        &mut self,
        scenario: &Scenario,
    ) -> Result<ScenarioRecord, SupervisorError> {
        let case_name = scenario.case_name();
        println!("{}", ui_str::test_started(&case_name));
        tracing::info!(message = "Scenario started", case = %case_name, dir = ?scenario.dir);

        match self.drive(scenario, &case_name).await {
            Ok(()) => {
                println!("{}", ui_str::test_passed(&case_name));
                tracing::info!(message = "Scenario passed", case = %case_name);
                Ok(ScenarioRecord::pass(case_name))
            }
            Err(ScenarioError::Supervisor(fatal)) => {
                tracing::error!(message = "App could not be started", case = %case_name, error = %fatal);
                Err(fatal)
            }
            Err(err) => {
                let diagnostic = err.to_string();
                println!("{}", ui_str::test_failed(&case_name, &diagnostic));
                tracing::warn!(message = "Scenario failed", case = %case_name, diagnostic = %diagnostic);
                Ok(ScenarioRecord::fail(case_name, diagnostic))
            }
        }
    }

    async fn drive(&mut self, scenario: &Scenario, case_name: &str) -> Result<(), ScenarioError> {
        let log_file = self.config.log_file.clone();

        self.checkpoint
            .advance_to_end()
            .map_err(|source| ScenarioError::Checkpoint {
                path: log_file.clone(),
                source,
            })?;

        let source = find_probe_source(&scenario.dir, &self.config.probe.source_extension)?;

        if self.supervisor.ensure_running().await? == RunState::Restarted {
            self.checkpoint.reset();
        }
        let offset = self.checkpoint.offset();

        let build = ProbeBuild::from_config(source, &self.config.probe);
        self.executor.build_and_run(&build).await?;

        let manifest = &scenario.manifest;
        let policy = self
            .config
            .completion
            .policy(manifest.completion_timeout_secs);
        if !wait_for_marker(&log_file, offset, &manifest.completion_marker, policy).await {
            tracing::warn!(
                message = "Completion marker not seen, verifying anyway",
                case = %case_name,
                marker = %manifest.completion_marker
            );
        }

        let archived = scenario
            .dir
            .join(&self.config.output_dir_name)
            .join(format!("{case_name}_subtec.log"));
        copy_log(&log_file, &archived).map_err(|source| ScenarioError::Archive {
            to: archived.clone(),
            source,
        })?;

        let chunk_size = self.config.scan.chunk_size;
        for (index, step) in manifest.steps.iter().enumerate() {
            let verify_failed = |kind, failure| ScenarioError::Verify {
                index,
                kind,
                failure,
            };
            let verification = step
                .to_verification(&archived, offset, chunk_size)
                .map_err(|failure| verify_failed("font size", failure))?;
            verification
                .verify(&archived, offset, chunk_size)
                .map_err(|failure| verify_failed(verification.kind(), failure))?;
        }
        Ok(())
    }
}
