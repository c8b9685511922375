// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ProbeBuild, ProbeError, TokioCommand};
use std::{path::PathBuf, process::Stdio};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

/// Builds and runs a scenario's probe. The orchestrator only knows this trait, so the
/// log verification core has no compiler dependency and tests can drive it with stub
/// probes.
pub trait ProbeExecutor {
    /// Compile `build` and run the result to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] if compiling fails, or the probe cannot be launched or
    /// exits abnormally. No retries.
    fn build_and_run(&self, build: &ProbeBuild)
    -> impl Future<Output = Result<(), ProbeError>>;
}

/// Compiles the probe with the configured native compiler and runs the binary, streaming
/// its stdout to the console line by line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProbeExecutor;

impl NativeProbeExecutor {
    /// Delete any stale binary, then compile. Returns the new binary's path.
    ///
    /// # Errors
    ///
    /// See [`ProbeExecutor::build_and_run`].
    pub async fn build(&self, build: &ProbeBuild) -> Result<PathBuf, ProbeError> {
        match tokio::fs::remove_file(&build.binary).await {
            Ok(()) => tracing::debug!(message = "Removed stale probe binary", binary = ?build.binary),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ProbeError::StaleBinary {
                    binary: build.binary.clone(),
                    source,
                });
            }
        }

        tracing::info!(message = "Compiling probe", source = ?build.source, binary = ?build.binary);
        let output = TokioCommand::new(&build.compiler)
            .args(build.compile_args())
            .current_dir(&build.work_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                program: build.compiler.clone().into(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(message = "Compilation of probe failed", stderr = %stderr);
            return Err(ProbeError::BuildFailed {
                source_file: build.source.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }
        if !build.binary.is_file() {
            return Err(ProbeError::BinaryMissing {
                binary: build.binary.clone(),
            });
        }
        Ok(build.binary.clone())
    }

    /// Run the compiled probe with `LD_LIBRARY_PATH` set, printing each stdout line as
    /// it arrives. Lines are decoded lossily, and stdout is always read to the end so the
    /// probe never dies writing to a closed pipe. Stderr is drained concurrently so the probe never blocks on a full
    /// pipe, and shows up in the failure diagnostic.
    ///
    /// # Errors
    ///
    /// See [`ProbeExecutor::build_and_run`].
    pub async fn run(&self, build: &ProbeBuild) -> Result<(), ProbeError> {
        if !build.binary.is_file() {
            return Err(ProbeError::BinaryMissing {
                binary: build.binary.clone(),
            });
        }

        let spawn_error = |source| ProbeError::Spawn {
            program: build.binary.clone(),
            source,
        };
        let mut child = TokioCommand::new(&build.binary)
            .current_dir(&build.work_dir)
            .env("LD_LIBRARY_PATH", &build.ld_library_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut bytes = Vec::new();
                stderr.read_to_end(&mut bytes).await.ok();
                String::from_utf8_lossy(&bytes).into_owned()
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&line);
                        println!("{}", text.trim_end_matches(['\n', '\r']));
                    }
                    Err(err) => {
                        tracing::warn!(message = "Probe stdout not readable, draining", error = %err);
                        tokio::io::copy(&mut reader, &mut tokio::io::sink()).await.ok();
                        break;
                    }
                }
            }
        }

        let status = child.wait().await.map_err(spawn_error)?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            tracing::debug!(message = "Probe execution is done, validating logs next");
            Ok(())
        } else {
            tracing::error!(message = "Probe exited abnormally", status = %status, stderr = %stderr);
            Err(ProbeError::RunFailed {
                binary: build.binary.clone(),
                status: status.to_string(),
                stderr,
            })
        }
    }
}

impl ProbeExecutor for NativeProbeExecutor {
    async fn build_and_run(&self, build: &ProbeBuild) -> Result<(), ProbeError> {
        self.build(build).await?;
        self.run(build).await
    }
}
