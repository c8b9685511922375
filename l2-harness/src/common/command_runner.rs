// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ok;
use miette::{Context, IntoDiagnostic};
use std::process::Stdio;
use tokio::process::Command;

/// Disambiguate the [`tokio::process::Command`] type from the [`std::process::Command`]
/// type. Every external program the harness touches (`pgrep`, `kill`, the compiler,
/// `make`, the probe binaries, the app launch script) goes through the tokio flavor so
/// that waiting on a child never blocks the runtime.
pub type TokioCommand = tokio::process::Command;

/// This macro creates a [`TokioCommand`] from a program and a set of arguments.
///
/// ```
/// # use subtec_l2_harness::command;
/// async fn run_command() {
///     let pattern = "subttxrend-app";
///     let mut command = command!(
///         program => "pgrep",
///         args => "-f", pattern,
///     );
///     let output = command.output().await.expect("Failed to execute command");
///     println!("{output:?}");
/// }
/// ```
#[macro_export]
macro_rules! command {
    // Variant that receives a command and args.
    (program=> $cmd:expr, args=> $($args:expr),* $(,)?) => {{
        let mut it = $crate::TokioCommand::new($cmd);
        $(
            it.arg($args);
        )*
        it
    }};
}

pub trait Run {
    /// # Errors
    ///
    /// Returns an error if:
    /// - The command program does not exist or cannot be executed
    /// - The command fails with a non-zero exit status
    fn run(
        &mut self,
    ) -> impl Future<Output = miette::Result<Vec<u8>>> + Send;

    /// # Errors
    ///
    /// Returns an error if:
    /// - The command program does not exist or cannot be executed
    /// - The command fails with a non-zero exit status
    fn run_interactive(
        &mut self,
    ) -> impl Future<Output = miette::Result<Vec<u8>>> + Send;
}

impl Run for TokioCommand {
    #[allow(clippy::missing_errors_doc)]
    async fn run(&mut self) -> miette::Result<Vec<u8>> { run(self).await }

    #[allow(clippy::missing_errors_doc)]
    async fn run_interactive(&mut self) -> miette::Result<Vec<u8>> {
        run_interactive(self).await
    }
}

#[macro_export]
macro_rules! bail_command_ran_and_failed {
    ($command:expr, $status:expr, $stderr:expr) => {
        miette::bail!(
            "{name} failed\n[command]: '{cmd:?}'\n[status]: '{status:?}'\n[stderr]: '{stderr}'",
            name = stringify!($command),
            cmd = $command,
            status = $status,
            stderr = String::from_utf8_lossy(&$stderr),
        );
    };
}

/// This command is not allowed to have user interaction. It does not inherit the
/// `stdin`, `stdout`, `stderr` from the parent (aka current) process.
///
/// # Errors
///
/// Returns an error if:
/// - The command program does not exist or cannot be executed
/// - The command fails with a non-zero exit status
pub async fn run(command: &mut Command) -> miette::Result<Vec<u8>> {
    // Try to run command (might be unable to run it if the program is invalid).
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .into_diagnostic()
        .wrap_err(miette::miette!("Unable to run command: {:?}", command))?;

    // At this point, the command has run, but it might result in a success or failure.
    if output.status.success() {
        ok!(output.stdout)
    } else {
        bail_command_ran_and_failed!(command, output.status, output.stderr);
    }
}

/// This command inherits the `stdin`, `stdout`, `stderr` from the parent (aka current)
/// process, so its output shows up on the console as it runs (eg: `make`).
///
/// # Errors
///
/// Returns an error if:
/// - The command program does not exist or cannot be executed
/// - The command fails with a non-zero exit status
pub async fn run_interactive(command: &mut Command) -> miette::Result<Vec<u8>> {
    let output = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output()
        .await
        .into_diagnostic()
        .wrap_err(miette::miette!("Unable to run command: {:?}", command))?;

    if output.status.success() {
        ok!(output.stdout)
    } else {
        bail_command_ran_and_failed!(command, output.status, output.stderr);
    }
}
