// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ScenarioFilter;
use clap::{Args, Parser};
use std::path::PathBuf;

/// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
#[derive(Debug, Parser)]
#[command(bin_name = "subtec-l2")]
#[command(about = "Run the subtec L2 conformance scenarios against subttxrend-app")]
#[command(version)]
#[command(next_line_help = true)]
#[command(arg_required_else_help(false))]
#[command(
    after_help = "With no selection options, every TEST_<NNNN>_* scenario in the tests directory runs, in number order."
)]
pub struct CLIArg {
    #[arg(
        long,
        short = 'i',
        num_args = 1..,
        value_name = "NUM",
        help = "Scenario numbers to run. Takes precedence over --exclude."
    )]
    pub include: Vec<String>,

    #[arg(
        long,
        short = 'e',
        num_args = 1..,
        value_name = "NUM",
        help = "Scenario numbers to skip."
    )]
    pub exclude: Vec<String>,

    #[arg(
        long,
        short = 'm',
        value_name = "MARK",
        help = "Only run scenarios whose manifest lists this mark."
    )]
    pub mark: Option<String>,

    #[arg(
        long,
        default_value = ".",
        help = "Directory that holds the TEST_* scenario directories."
    )]
    pub tests_dir: PathBuf,

    #[arg(
        long,
        help = "Harness config file. Defaults to l2_harness.json5 in the tests directory, if present."
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Where to write the JSON results. Overrides the config's results_file.")]
    pub results: Option<PathBuf>,

    #[command(flatten)]
    pub global_options: GlobalOption,
}

#[derive(Debug, Args)]
pub struct GlobalOption {
    #[arg(
        global = true,
        long,
        help = "Do not run make for the support library before the run."
    )]
    pub skip_lib_build: bool,

    #[arg(
        global = true,
        long,
        short = 'l',
        help = "Also log to a timestamped run_l2_subtec_<time>.log file."
    )]
    pub enable_logging: bool,
}

impl CLIArg {
    #[must_use]
    pub fn to_filter(&self) -> ScenarioFilter {
        ScenarioFilter {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            mark: self.mark.clone(),
        }
    }
}
