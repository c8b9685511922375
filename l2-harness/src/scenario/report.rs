// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ScenarioStatus {
    #[serde(rename = "PASS")]
    #[strum(serialize = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    #[strum(serialize = "FAIL")]
    Fail,
}

/// One entry of the results file, per executed scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub case_name: String,
    pub status: ScenarioStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ScenarioRecord {
    pub fn pass(case_name: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            status: ScenarioStatus::Pass,
            diagnostic: None,
        }
    }

    pub fn fail(case_name: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            status: ScenarioStatus::Fail,
            diagnostic: Some(diagnostic.into()),
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool { self.status == ScenarioStatus::Pass }
}

/// Write `records` as a pretty JSON array.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_results(path: &Path, records: &[ScenarioRecord]) -> miette::Result<()> {
    let json = serde_json::to_string_pretty(records).into_diagnostic()?;
    std::fs::write(path, json + "\n")
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not write results to {path:?}"))?;
    tracing::info!(message = "Wrote results", path = ?path, count = records.len());
    Ok(())
}

/// Summary table, one row per scenario, with each column as wide as its widest cell:
///
/// ```text
/// +-------------------------+
/// | Test Case Name | Status |
/// +-------------------------+
/// | test_1019      | PASS   |
/// +-------------------------+
/// ```
#[must_use]
pub fn format_summary_table(records: &[ScenarioRecord]) -> String {
    const NAME_HEADER: &str = "Test Case Name";
    const STATUS_HEADER: &str = "Status";

    let statuses: Vec<String> = records.iter().map(|it| it.status.to_string()).collect();
    let name_width = records
        .iter()
        .map(|it| it.case_name.len())
        .chain([NAME_HEADER.len()])
        .max()
        .unwrap_or_default();
    let status_width = statuses
        .iter()
        .map(String::len)
        .chain([STATUS_HEADER.len()])
        .max()
        .unwrap_or_default();

    let total_width = name_width + status_width + 7;
    let border = format!("+{}+", "-".repeat(total_width - 2));
    let row = |name: &str, status: &str| {
        format!("| {name:<name_width$} | {status:<status_width$} |")
    };

    let mut lines = vec![border.clone(), row(NAME_HEADER, STATUS_HEADER), border.clone()];
    for (record, status) in records.iter().zip(&statuses) {
        lines.push(row(&record.case_name, status));
    }
    lines.push(border);
    lines.join("\n")
}

#[cfg(test)]
mod tests_report {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_summary_table_layout() {
        let records = vec![
            ScenarioRecord::pass("test_1019"),
            ScenarioRecord::fail("test_1051_long_case_name", "\"x\" is not found"),
        ];
        let expected = "\
+-----------------------------------+
| Test Case Name           | Status |
+-----------------------------------+
| test_1019                | PASS   |
| test_1051_long_case_name | FAIL   |
+-----------------------------------+";
        assert_eq!(format_summary_table(&records), expected);
    }

    #[test]
    fn test_summary_table_empty() {
        let table = format_summary_table(&[]);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("| Test Case Name | Status |"));
    }

    #[test]
    fn test_results_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l2_results.json");
        let records = vec![
            ScenarioRecord::pass("test_1019"),
            ScenarioRecord::fail("test_1051", "boom"),
        ];
        write_results(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"status\": \"PASS\""));
        assert!(!text.contains("\"diagnostic\": null"));
        let parsed: Vec<ScenarioRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ScenarioStatus::Fail.to_string(), "FAIL");
        assert_eq!(ScenarioStatus::from_str("PASS").unwrap(), ScenarioStatus::Pass);
    }
}
