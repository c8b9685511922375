// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{MANIFEST_FILE_NAME, ManifestError, ScenarioManifest};
use regex::Regex;
use std::{collections::BTreeMap,
          path::{Path, PathBuf},
          sync::LazyLock};

/// Directory names that carry a scenario number, eg: `TEST_1051_CC_708_attrib`.
static SCENARIO_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_\-]+(\d{4,})").expect("Invalid scenario dir regex"));

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DiscoveryError {
    #[error("Duplicate scenario number {number}: {first:?} and {second:?}")]
    #[diagnostic(
        code(subtec_l2::discovery::duplicate_number),
        help("Scenario numbers must be unique across the tests directory")
    )]
    DuplicateNumber {
        number: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Could not list tests directory {dir:?}")]
    #[diagnostic(code(subtec_l2::discovery::unreadable_dir))]
    UnreadableDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),
}

/// A scenario directory with its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// The digits from the directory name, eg: `"1051"`.
    pub number: String,
    pub dir: PathBuf,
    pub manifest: ScenarioManifest,
}

impl Scenario {
    #[must_use]
    pub fn case_name(&self) -> String {
        self.manifest
            .case_name
            .clone()
            .unwrap_or_else(|| format!("test_{}", self.number))
    }
}

/// Which scenarios to run. `include` wins over `exclude` when both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub mark: Option<String>,
}

impl ScenarioFilter {
    #[must_use]
    pub fn selects_number(&self, number: &str) -> bool {
        if self.include.is_empty() {
            !self.exclude.iter().any(|it| it == number)
        } else {
            self.include.iter().any(|it| it == number)
        }
    }

    #[must_use]
    pub fn selects_marks(&self, marks: &[String]) -> bool {
        self.mark
            .as_ref()
            .is_none_or(|mark| marks.iter().any(|it| it == mark))
    }
}

/// Extract the scenario number from a directory name, if it has one.
#[must_use]
pub fn scenario_number(dir_name: &str) -> Option<&str> {
    SCENARIO_DIR
        .captures(dir_name)
        .and_then(|it| it.get(1))
        .map(|it| it.as_str())
}

/// Scan `tests_dir` (one level deep) for scenarios, apply `filter`, and return them in
/// run order: sorted by the number's digit string.
///
/// Only directories named `TEST_*` that contain [`MANIFEST_FILE_NAME`] are scenarios.
/// Other numbered directories still count towards the duplicate check.
///
/// # Errors
///
/// - [`DiscoveryError::DuplicateNumber`] if two directories share a number.
/// - [`DiscoveryError::Manifest`] if a selected scenario's manifest is broken.
/// - [`DiscoveryError::UnreadableDir`] if `tests_dir` cannot be listed.
pub fn discover_scenarios(
    tests_dir: &Path,
    filter: &ScenarioFilter,
) -> Result<Vec<Scenario>, DiscoveryError> {
    let unreadable = |source| DiscoveryError::UnreadableDir {
        dir: tests_dir.to_path_buf(),
        source,
    };

    let mut numbered: BTreeMap<String, PathBuf> = BTreeMap::new();
    for entry in std::fs::read_dir(tests_dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(number) = scenario_number(&name) else {
            continue;
        };
        if let Some(first) = numbered.get(number) {
            let (first, second) = ordered_pair(first.clone(), path);
            return Err(DiscoveryError::DuplicateNumber {
                number: number.to_string(),
                first,
                second,
            });
        }
        numbered.insert(number.to_string(), path);
    }

    let mut scenarios = Vec::new();
    for (number, dir) in numbered {
        let is_test_dir = dir
            .file_name()
            .is_some_and(|it| it.to_string_lossy().starts_with("TEST_"));
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        if !is_test_dir || !filter.selects_number(&number) || !manifest_path.is_file() {
            continue;
        }

        let manifest = ScenarioManifest::load(&manifest_path)?;
        if !filter.selects_marks(&manifest.marks) {
            tracing::debug!(message = "Skipping scenario, mark not selected", number = %number);
            continue;
        }
        scenarios.push(Scenario {
            number,
            dir,
            manifest,
        });
    }

    tracing::info!(message = "Discovered scenarios", count = scenarios.len());
    Ok(scenarios)
}

/// `read_dir` order is unspecified; report duplicates in a stable order.
fn ordered_pair(a: PathBuf, b: PathBuf) -> (PathBuf, PathBuf) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests_discovery {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn add_scenario(root: &Path, dir_name: &str, marks: &[&str]) {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(MANIFEST_FILE_NAME),
            format!("{{ marks: {marks:?}, completion_marker: \"done\" }}"),
        )
        .unwrap();
    }

    fn numbers(scenarios: &[Scenario]) -> Vec<&str> {
        scenarios.iter().map(|it| it.number.as_str()).collect()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        add_scenario(dir.path(), "TEST_1051_CC_708_attrib", &["cc_708"]);
        add_scenario(dir.path(), "TEST_1019_webvtt_Attrib_fontSize", &["webvtt"]);
        add_scenario(dir.path(), "TEST_1073_ttml_Attrib_bgColor", &["ttml"]);
        // Not scenarios.
        std::fs::create_dir(dir.path().join("libsubtec")).unwrap();
        std::fs::create_dir(dir.path().join("TEST_2000_no_manifest")).unwrap();
        std::fs::write(dir.path().join("TEST_3000.txt"), "").unwrap();
        dir
    }

    #[test_case("TEST_1051_CC_708_attrib", Some("1051"))]
    #[test_case("TEST_10511_x", Some("10511"))]
    #[test_case("TEST_105_short", None)]
    #[test_case("libsubtec", None)]
    #[test_case("test_1051_lowercase", None)]
    fn test_scenario_number(name: &str, expected: Option<&str>) {
        assert_eq!(scenario_number(name), expected);
    }

    #[test]
    fn test_all_sorted() {
        let dir = fixture();
        let scenarios = discover_scenarios(dir.path(), &ScenarioFilter::default()).unwrap();
        assert_eq!(numbers(&scenarios), vec!["1019", "1051", "1073"]);
        assert_eq!(scenarios[0].case_name(), "test_1019");
    }

    #[test]
    fn test_include_wins_over_exclude() {
        let dir = fixture();
        let filter = ScenarioFilter {
            include: vec!["1073".into(), "1019".into()],
            exclude: vec!["1019".into()],
            mark: None,
        };
        let scenarios = discover_scenarios(dir.path(), &filter).unwrap();
        assert_eq!(numbers(&scenarios), vec!["1019", "1073"]);
    }

    #[test]
    fn test_exclude_and_mark() {
        let dir = fixture();
        let filter = ScenarioFilter {
            exclude: vec!["1019".into()],
            ..Default::default()
        };
        assert_eq!(
            numbers(&discover_scenarios(dir.path(), &filter).unwrap()),
            vec!["1051", "1073"]
        );

        let filter = ScenarioFilter {
            mark: Some("webvtt".into()),
            ..Default::default()
        };
        assert_eq!(
            numbers(&discover_scenarios(dir.path(), &filter).unwrap()),
            vec!["1019"]
        );
    }

    #[test]
    fn test_duplicate_number_is_fatal() {
        let dir = fixture();
        add_scenario(dir.path(), "TEST_1051_duplicate", &[]);
        let result = discover_scenarios(dir.path(), &ScenarioFilter::default());
        match result {
            Err(DiscoveryError::DuplicateNumber { number, .. }) => assert_eq!(number, "1051"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_broken_manifest_is_reported() {
        let dir = fixture();
        std::fs::write(
            dir.path().join("TEST_1073_ttml_Attrib_bgColor").join(MANIFEST_FILE_NAME),
            "{ not json",
        )
        .unwrap();
        let result = discover_scenarios(dir.path(), &ScenarioFilter::default());
        assert!(matches!(result, Err(DiscoveryError::Manifest(_))));
    }
}
