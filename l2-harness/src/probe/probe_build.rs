// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ProbeConfig;
use std::{ffi::OsString,
          path::{Path, PathBuf}};

/// Everything needed to compile one scenario's probe and run it. Built from the
/// scenario's source file plus the harness [`ProbeConfig`]; holds no state between
/// scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeBuild {
    pub source: PathBuf,
    /// The scenario directory. The compiler and the probe both run here, and the binary
    /// is written here.
    pub work_dir: PathBuf,
    pub binary: PathBuf,
    pub compiler: String,
    pub support_source: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub fixed_include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub defines: Vec<String>,
    pub ld_library_path: String,
}

impl ProbeBuild {
    /// `TEST_1051_cc708_pen_attributes.cpp` becomes `TEST_1051_bin`: the first two `_`
    /// separated tokens of the file stem, plus `_bin`.
    #[must_use]
    pub fn binary_name(source: &Path) -> String {
        let stem = source
            .file_stem()
            .map(|it| it.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix: Vec<&str> = stem.split('_').take(2).collect();
        format!("{}_bin", prefix.join("_"))
    }

    /// `probe` must already be [resolved] against the tests directory.
    ///
    /// [resolved]: crate::HarnessConfig::resolve
    #[must_use]
    pub fn from_config(source: impl Into<PathBuf>, probe: &ProbeConfig) -> Self {
        let source = source.into();
        let work_dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let binary = work_dir.join(Self::binary_name(&source));
        let library_dirs: Vec<PathBuf> = probe.library_dir.iter().cloned().collect();
        let ld_library_path = match &probe.ld_library_path {
            Some(it) => it.clone(),
            None => std::env::join_paths(&library_dirs)
                .map(|it| it.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        Self {
            source,
            work_dir,
            binary,
            compiler: probe.compiler.clone(),
            support_source: probe.support_source.clone(),
            include_dirs: probe.include_dirs.clone(),
            fixed_include_dirs: probe.fixed_include_dirs.clone(),
            library_dirs,
            libraries: probe.libraries.clone(),
            defines: probe.defines.clone(),
            ld_library_path,
        }
    }

    /// Compiler arguments, in the order the probes have always been built with:
    /// `<source> <support> -o <binary> -I.. (scenario) -I.. (fixed) -L.. -l.. -D..`
    #[must_use]
    pub fn compile_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.source.clone().into(),
            self.support_source.clone().into(),
            "-o".into(),
            self.binary.clone().into(),
        ];
        let flagged = |flag: &str, value: OsString| [OsString::from(flag), value];

        for dir in self.include_dirs.iter().chain(&self.fixed_include_dirs) {
            args.extend(flagged("-I", dir.clone().into()));
        }
        for dir in &self.library_dirs {
            args.extend(flagged("-L", dir.clone().into()));
        }
        for lib in &self.libraries {
            args.extend(flagged("-l", lib.into()));
        }
        for define in &self.defines {
            args.extend(flagged("-D", define.into()));
        }
        args
    }
}
