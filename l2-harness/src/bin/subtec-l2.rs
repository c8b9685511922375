// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Entry point for the L2 run. Setup-fatal problems (bad config, duplicate scenario
//! numbers, the app never becoming ready) surface as a miette report and exit code `1`.
//! A failed scenario does not stop the run, it only changes the exit code.

use clap::Parser;
use miette::IntoDiagnostic;
use subtec_l2_harness::{CLIArg, DisplayPreference, HarnessConfig, NativeProbeExecutor,
                        Orchestrator, ProcessSupervisor, RunReport, Scenario, TracingConfig,
                        WriterConfig, build_support_library, discover_scenarios,
                        format_summary_table, harness_log_file_name, ok,
                        setup_default_miette_global_report_handler,
                        try_initialize_logging_global, ui_str, write_results};
use tracing_core::LevelFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(ui_str::MIETTE_FOOTER);

    let cli_arg = CLIArg::parse();
    let tests_dir = std::path::absolute(&cli_arg.tests_dir).into_diagnostic()?;

    let writer_config = if cli_arg.global_options.enable_logging {
        let file = tests_dir.join(harness_log_file_name(chrono::Local::now()));
        WriterConfig::DisplayAndFile(DisplayPreference::Stdout, file)
    } else {
        WriterConfig::Display(DisplayPreference::Stdout)
    };
    try_initialize_logging_global(TracingConfig {
        writer_config,
        level_filter: LevelFilter::INFO,
    })?;
    // % is Display, ? is Debug.
    tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);

    let mut config = HarnessConfig::load(&tests_dir, cli_arg.config.as_deref())?;
    if let Some(results) = &cli_arg.results {
        config.results_file = std::path::absolute(results).into_diagnostic()?;
    }

    let scenarios = discover_scenarios(&tests_dir, &cli_arg.to_filter())?;
    if scenarios.is_empty() {
        println!("{}", ui_str::no_scenarios_selected());
    }

    if !cli_arg.global_options.skip_lib_build {
        let dest_dir = config.library_dir().unwrap_or(&tests_dir).to_path_buf();
        if let Err(report) = build_support_library(&config.support_library, &dest_dir).await {
            tracing::error!(message = "Support library build failed, continuing", error = ?report);
        }
    }

    let report = run_scenarios(config.clone(), &scenarios).await;
    let records = &report.records;

    // Whatever finished before a fatal error still gets written and summarized.
    write_results(&config.results_file, records)?;
    println!("{}", format_summary_table(records));

    let passed = records.iter().filter(|it| it.passed()).count();
    println!("{}", ui_str::run_summary(passed, scenarios.len()));

    let all_passed = report.all_passed();
    if let Some(fatal) = report.fatal {
        return Err(fatal.into());
    }
    if !all_passed {
        std::process::exit(1);
    }
    ok!()
}

async fn run_scenarios(config: HarnessConfig, scenarios: &[Scenario]) -> RunReport {
    let supervisor = ProcessSupervisor::new(config.app.clone(), config.log_file.clone());
    let mut orchestrator = Orchestrator::new(config, supervisor, NativeProbeExecutor);
    orchestrator.run_all(scenarios).await
}
