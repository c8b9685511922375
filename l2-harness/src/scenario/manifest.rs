// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ExpectedSequence, ForbiddenSet, Verification, VerifyFailure,
            calculate_webvtt_font_size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in every scenario directory.
pub const MANIFEST_FILE_NAME: &str = "scenario.json5";

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ManifestError {
    #[error("Could not read scenario manifest {path:?}")]
    #[diagnostic(code(subtec_l2::manifest::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse scenario manifest {path:?}: {reason}")]
    #[diagnostic(
        code(subtec_l2::manifest::parse),
        help("`completion_marker` is required, and each step is one of `sequence`, `between`, or `absent`")
    )]
    Parse { path: PathBuf, reason: String },
}

/// What a scenario checks once its probe has run. The probe itself is the directory's
/// native source file; this is everything else.
///
/// ```json5
/// {
///   marks: ["webvtt", "attributes"],
///   completion_marker: "Sample text to test FONT_SIZE_EXTRALARGE",
///   steps: [
///     { sequence: { expected: ["type:WEBVTT_SELECTION", "type:UNMUTE"] } },
///     { absent: { forbidden: ["Selecting TTML"] } },
///   ],
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioManifest {
    /// Defaults to `test_<NNNN>`.
    #[serde(default)]
    pub case_name: Option<String>,
    /// Tags for `--mark` selection.
    #[serde(default)]
    pub marks: Vec<String>,
    /// The last thing the app logs for this scenario. Verification starts once it shows
    /// up (or its wait times out).
    pub completion_marker: String,
    #[serde(default)]
    pub completion_timeout_secs: Option<u64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One verification step. Steps run in order and the first failure ends the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Sequence {
        expected: ExpectedSequence,
        /// Append a font size line, derived from the log, to `expected`.
        #[serde(default)]
        webvtt_font_size: Option<FontSizeLine>,
    },
    Between {
        expected: Vec<String>,
        marker1: String,
        /// Empty means "between the first and last `marker1`".
        #[serde(default)]
        marker2: String,
    },
    Absent {
        forbidden: ForbiddenSet,
    },
}

/// A log line whose font size is only known at run time. `template` contains `{size}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizeLine {
    pub font_height: u32,
    pub template: String,
}

impl FontSizeLine {
    #[must_use]
    pub fn render(&self, size: u32) -> String { self.template.replace("{size}", &size.to_string()) }
}

impl ScenarioManifest {
    /// # Errors
    ///
    /// Returns a [`ManifestError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json5(&text, path)
    }

    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if `text` is not a valid manifest.
    pub fn from_json5(text: &str, origin: &Path) -> Result<Self, ManifestError> {
        json5::from_str(text).map_err(|err| ManifestError::Parse {
            path: origin.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

impl Step {
    /// Turn this step into a concrete [`Verification`] against `log` at `offset`. Only a
    /// font size step reads the log here.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyFailure`] if a font size line is needed and cannot be derived.
    pub fn to_verification(
        &self,
        log: &Path,
        offset: u64,
        chunk_size: usize,
    ) -> Result<Verification, VerifyFailure> {
        Ok(match self {
            Self::Sequence {
                expected,
                webvtt_font_size,
            } => {
                let mut expected = expected.clone();
                if let Some(line) = webvtt_font_size {
                    let size =
                        calculate_webvtt_font_size(log, offset, line.font_height, chunk_size)?;
                    expected.push(line.render(size));
                }
                Verification::Sequence(expected)
            }
            Self::Between {
                expected,
                marker1,
                marker2,
            } => Verification::Between {
                expected: expected.clone(),
                marker1: marker1.clone(),
                marker2: marker2.clone(),
            },
            Self::Absent { forbidden } => Verification::Absent(forbidden.clone()),
        })
    }
}

#[cfg(test)]
mod tests_manifest {
    use super::*;
    use crate::DEFAULT_CHUNK_SIZE;
    use pretty_assertions::assert_eq;

    const FONT_SIZE_MANIFEST: &str = r#"{
        case_name: "test_1019",
        marks: ["webvtt", "attributes"],
        completion_marker: "Sample text to test FONT_SIZE_EXTRALARGE",
        steps: [
            { sequence: { expected: ["type:RESET_CHANNEL", "type:WEBVTT_SELECTION"] } },
            {
                sequence: {
                    expected: ["new value for attibId[0x20] = 0"],
                    webvtt_font_size: {
                        font_height: 315,
                        template: "getFont - get fontFamily:Cinecav Mono  size:{size}",
                    },
                },
            },
            { between: { expected: ["a", "b"], marker1: "START" } },
            { absent: { forbidden: ["Selecting TTML"] } },
        ],
    }"#;

    #[test]
    fn test_parse_all_step_kinds() {
        let manifest =
            ScenarioManifest::from_json5(FONT_SIZE_MANIFEST, Path::new("scenario.json5"))
                .unwrap();
        assert_eq!(manifest.case_name.as_deref(), Some("test_1019"));
        assert_eq!(manifest.completion_timeout_secs, None);
        assert_eq!(manifest.steps.len(), 4);
        assert_eq!(
            manifest.steps[2],
            Step::Between {
                expected: vec!["a".into(), "b".into()],
                marker1: "START".into(),
                marker2: String::new(),
            }
        );
    }

    #[test]
    fn test_missing_completion_marker_is_rejected() {
        let result = ScenarioManifest::from_json5("{ steps: [] }", Path::new("x"));
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_font_size_step_appends_rendered_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(
            &log,
            "[WebvttEngine::LineBuilder] getOutputLines - line added \
             rect:rect:[0;900][1920x180] position:0\n",
        )
        .unwrap();

        let step = Step::Sequence {
            expected: ExpectedSequence::new(["attibId[0x20] = 0"]),
            webvtt_font_size: Some(FontSizeLine {
                font_height: 315,
                template: "size:{size}".into(),
            }),
        };
        assert_eq!(
            step.to_verification(&log, 0, DEFAULT_CHUNK_SIZE).unwrap(),
            Verification::Sequence(ExpectedSequence::new(["attibId[0x20] = 0", "size:34"]))
        );
    }

    #[test]
    fn test_font_size_step_without_rect_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, "nothing\n").unwrap();
        let step = Step::Sequence {
            expected: ExpectedSequence::default(),
            webvtt_font_size: Some(FontSizeLine {
                font_height: 315,
                template: "size:{size}".into(),
            }),
        };
        assert_eq!(
            step.to_verification(&log, 0, DEFAULT_CHUNK_SIZE),
            Err(VerifyFailure::FontRectNotFound)
        );
    }
}
