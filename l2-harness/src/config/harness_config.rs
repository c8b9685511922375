// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`HarnessConfig`] is read from a `json5` file. Every field has a default that matches
//! the stock `test/` layout of the subtec repo, so an empty file (or no file at all) is
//! a valid config.
//!
//! Relative paths are interpreted against the tests directory, not the current working
//! directory; call [`HarnessConfig::resolve`] once after loading.

use crate::{DEFAULT_CHUNK_SIZE, PollPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the tests directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "l2_harness.json5";

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("Could not read config file {path:?}")]
    #[diagnostic(code(subtec_l2::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file {path:?}: {reason}")]
    #[diagnostic(
        code(subtec_l2::config::parse),
        help("The file is json5; every field is optional")
    )]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// The app's merged stdout and stderr. Shared by every scenario in a run.
    pub log_file: PathBuf,
    pub app: AppConfig,
    pub probe: ProbeConfig,
    pub scan: ScanConfig,
    pub completion: CompletionConfig,
    pub support_library: SupportLibraryConfig,
    /// Per-scenario subdirectory that receives the archived log copy.
    pub output_dir_name: String,
    pub results_file: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            log_file: "subtec_console_common.log".into(),
            app: AppConfig::default(),
            probe: ProbeConfig::default(),
            scan: ScanConfig::default(),
            completion: CompletionConfig::default(),
            support_library: SupportLibraryConfig::default(),
            output_dir_name: "output_files".into(),
            results_file: "l2_results.json".into(),
        }
    }
}

/// How to tell whether the app is up, and how to bring it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Command line substrings. The app counts as running only if every one matches.
    pub process_names: Vec<String>,
    pub launch_dir: PathBuf,
    pub launch_command: Vec<String>,
    pub ready_marker: String,
    pub ready_timeout_secs: u64,
    pub ready_poll_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            process_names: vec!["build.sh".into(), "subttxrend-app".into()],
            launch_dir: "../subttxrend-app/x86_builder".into(),
            launch_command: ["stdbuf", "-o0", "./build.sh", "run"]
                .map(String::from)
                .to_vec(),
            ready_marker: "subttxrend-app started".into(),
            ready_timeout_secs: 500,
            ready_poll_secs: 1,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn ready_policy(&self) -> PollPolicy {
        PollPolicy::from_secs(self.ready_timeout_secs, self.ready_poll_secs)
    }
}

/// Compile and run settings for the native probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub compiler: String,
    pub source_extension: String,
    /// Compiled into every probe.
    pub support_source: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    /// Always passed after `include_dirs`.
    pub fixed_include_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    /// `-L` directory. Defaults to the tests directory, where the support library is
    /// copied to.
    pub library_dir: Option<PathBuf>,
    pub defines: Vec<String>,
    /// `LD_LIBRARY_PATH` for the probe. Defaults to the library directory.
    pub ld_library_path: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".into(),
            source_extension: "cpp".into(),
            support_source: "utils/utils.cpp".into(),
            include_dirs: vec!["libsubtec".into()],
            fixed_include_dirs: vec!["subtecparser".into(), "utils".into()],
            libraries: vec!["subtec".into()],
            library_dir: None,
            defines: vec!["SUBTEC_PACKET_DEBUG=1".into()],
            ld_library_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub chunk_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Default wait for a scenario's completion marker. A manifest can override the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub timeout_secs: u64,
    pub poll_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            poll_secs: 3,
        }
    }
}

impl CompletionConfig {
    #[must_use]
    pub fn policy(&self, timeout_override_secs: Option<u64>) -> PollPolicy {
        PollPolicy::from_secs(
            timeout_override_secs.unwrap_or(self.timeout_secs),
            self.poll_secs,
        )
    }
}

/// The shared library every probe links against, built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportLibraryConfig {
    pub make_dir: PathBuf,
    pub artifact: String,
}

impl Default for SupportLibraryConfig {
    fn default() -> Self {
        Self {
            make_dir: "libsubtec".into(),
            artifact: "libsubtec.so".into(),
        }
    }
}

impl HarnessConfig {
    /// Parse a config from `json5` text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid `json5`, or a field has
    /// the wrong type.
    pub fn from_json5(text: &str, origin: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        json5::from_str(text).map_err(|err| ConfigError::Parse {
            path: origin.into(),
            reason: err.to_string(),
        })
    }

    /// Load the config for a run and resolve its paths against `tests_dir`.
    ///
    /// - `explicit` is `Some` when `--config` was given; that file must exist.
    /// - Otherwise [`CONFIG_FILE_NAME`] in `tests_dir` is used if present.
    /// - Otherwise the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the chosen file cannot be read or parsed.
    pub fn load(tests_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let path = tests_dir.join(CONFIG_FILE_NAME);
                path.is_file().then_some(path)
            }
        };

        let config = match candidate {
            Some(path) => {
                tracing::info!(message = "Loading config", path = ?path);
                let text = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                Self::from_json5(&text, path)?
            }
            None => {
                tracing::info!(message = "No config file, using defaults", tests_dir = ?tests_dir);
                Self::default()
            }
        };

        Ok(config.resolve(tests_dir))
    }

    /// Make every relative path absolute against `tests_dir`, and fill in the library
    /// directory default.
    #[must_use]
    pub fn resolve(mut self, tests_dir: &Path) -> Self {
        let under = |path: &Path| -> PathBuf {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                tests_dir.join(path)
            }
        };

        self.log_file = under(&self.log_file);
        self.results_file = under(&self.results_file);
        self.app.launch_dir = under(&self.app.launch_dir);
        self.support_library.make_dir = under(&self.support_library.make_dir);

        let probe = &mut self.probe;
        probe.support_source = under(&probe.support_source);
        probe.include_dirs = probe.include_dirs.iter().map(|it| under(it)).collect();
        probe.fixed_include_dirs = probe
            .fixed_include_dirs
            .iter()
            .map(|it| under(it))
            .collect();
        probe.library_dir = Some(match &probe.library_dir {
            Some(dir) => under(dir),
            None => tests_dir.to_path_buf(),
        });

        self
    }

    /// The `-L` directory, after [`resolve`](Self::resolve).
    #[must_use]
    pub fn library_dir(&self) -> Option<&Path> { self.probe.library_dir.as_deref() }
}

#[cfg(test)]
mod tests_harness_config {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = HarnessConfig::from_json5("{}", "l2_harness.json5").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.app.ready_timeout_secs, 500);
        assert_eq!(config.scan.chunk_size, 524_288);
        assert_eq!(config.completion.policy(None), PollPolicy::from_secs(15, 3));
        assert_eq!(config.completion.policy(Some(60)), PollPolicy::from_secs(60, 3));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let text = r#"{
            // Faster app start on a dev box.
            app: { ready_timeout_secs: 30 },
            probe: { defines: ["SUBTEC_PACKET_DEBUG=1", "EXTRA=2"] },
            results_file: "/tmp/results.json",
        }"#;
        let config = HarnessConfig::from_json5(text, "x.json5").unwrap();
        assert_eq!(config.app.ready_timeout_secs, 30);
        assert_eq!(config.app.ready_marker, "subttxrend-app started");
        assert_eq!(config.probe.defines.len(), 2);
        assert_eq!(config.probe.compiler, "g++");
        assert_eq!(config.results_file, PathBuf::from("/tmp/results.json"));
    }

    #[test]
    fn test_bad_type_is_parse_error() {
        let result = HarnessConfig::from_json5("{ scan: { chunk_size: \"big\" } }", "x");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_resolve_against_tests_dir() {
        let tests_dir = Path::new("/work/subtec/test");
        let config = HarnessConfig::default().resolve(tests_dir);
        assert_eq!(
            config.log_file,
            PathBuf::from("/work/subtec/test/subtec_console_common.log")
        );
        assert_eq!(
            config.app.launch_dir,
            PathBuf::from("/work/subtec/test/../subttxrend-app/x86_builder")
        );
        assert_eq!(config.library_dir(), Some(tests_dir));
        assert_eq!(
            config.probe.fixed_include_dirs,
            vec![
                PathBuf::from("/work/subtec/test/subtecparser"),
                PathBuf::from("/work/subtec/test/utils"),
            ]
        );
    }

    #[test]
    fn test_load_picks_up_file_in_tests_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "{ log_file: 'app.log' }",
        )
        .unwrap();
        let config = HarnessConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.log_file, dir.path().join("app.log"));
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json5");
        let result = HarnessConfig::load(dir.path(), Some(&missing));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
