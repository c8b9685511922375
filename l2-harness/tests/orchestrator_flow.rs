// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! End to end scenario runs with a stub app and stub probes. The stub supervisor plays
//! the app (creating and truncating its log on restart), and each stub probe appends
//! the lines the real app would have logged in response to it.

use pretty_assertions::assert_eq;
use std::{collections::HashMap,
          io::Write,
          path::{Path, PathBuf},
          sync::Mutex};
use subtec_l2_harness::{CompletionConfig, HarnessConfig, MANIFEST_FILE_NAME, Orchestrator,
                        ProbeBuild, ProbeError, ProbeExecutor, RunState, ScenarioFilter,
                        ScenarioStatus, Supervise, SupervisorError, discover_scenarios};

const READY: &str = "subttxrend-app started\n";

struct StubApp {
    log_file: PathBuf,
    /// One entry per expected `ensure_running` call. `true` means "the app was down".
    restarts: Vec<bool>,
    /// Restarts from this `ensure_running` call on never become ready.
    fail_restarts_from: Option<usize>,
    ensure_calls: usize,
    cleanup_calls: usize,
}

impl StubApp {
    fn new(log_file: &Path, restarts: &[bool]) -> Self {
        Self {
            log_file: log_file.to_path_buf(),
            restarts: restarts.to_vec(),
            fail_restarts_from: None,
            ensure_calls: 0,
            cleanup_calls: 0,
        }
    }
}

impl Supervise for StubApp {
    async fn ensure_running(&mut self) -> Result<RunState, SupervisorError> {
        let call = self.ensure_calls;
        let restart = self.restarts.get(call).copied().unwrap_or(false);
        self.ensure_calls += 1;
        if !restart {
            return Ok(RunState::AlreadyRunning);
        }
        if self.fail_restarts_from.is_some_and(|from| call >= from) {
            return Err(SupervisorError::NotReady {
                marker: READY.trim().to_string(),
                timeout_secs: 0,
                log_path: self.log_file.clone(),
            });
        }
        std::fs::write(&self.log_file, READY).unwrap();
        Ok(RunState::Restarted)
    }

    async fn cleanup(&mut self) { self.cleanup_calls += 1; }
}

/// Appends canned lines to the app log, keyed by scenario directory name.
struct StubProbes {
    log_file: PathBuf,
    output: HashMap<String, Vec<String>>,
    ran: Mutex<Vec<String>>,
}

impl StubProbes {
    fn new(log_file: &Path, output: &[(&str, Vec<&str>)]) -> Self {
        Self {
            log_file: log_file.to_path_buf(),
            output: output
                .iter()
                .map(|(dir, lines)| {
                    (
                        (*dir).to_string(),
                        lines.iter().map(ToString::to_string).collect(),
                    )
                })
                .collect(),
            ran: Mutex::new(vec![]),
        }
    }

    fn ran(&self) -> Vec<String> { self.ran.lock().unwrap().clone() }
}

impl ProbeExecutor for StubProbes {
    async fn build_and_run(&self, build: &ProbeBuild) -> Result<(), ProbeError> {
        let dir_name = build
            .work_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        self.ran.lock().unwrap().push(dir_name.clone());

        let Some(lines) = self.output.get(&dir_name) else {
            return Err(ProbeError::BinaryMissing {
                binary: build.binary.clone(),
            });
        };
        let mut log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .unwrap();
        for line in lines {
            writeln!(log, "{line}").unwrap();
        }
        Ok(())
    }
}

fn add_scenario(root: &Path, dir_name: &str, manifest: &str) {
    let dir = root.join(dir_name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{dir_name}.cpp")), "int main() {}\n").unwrap();
    std::fs::write(dir.join(MANIFEST_FILE_NAME), manifest).unwrap();
}

fn config(tests_dir: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default().resolve(tests_dir);
    config.completion = CompletionConfig {
        timeout_secs: 0,
        poll_secs: 0,
    };
    config.scan.chunk_size = 16;
    config
}

#[tokio::test]
async fn test_pass_and_fail_are_recorded_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    add_scenario(
        root,
        "TEST_1001_selection",
        r#"{
            completion_marker: "type:UNMUTE",
            steps: [
                { sequence: { expected: ["type:WEBVTT_SELECTION", "type:UNMUTE"] } },
                { absent: { forbidden: ["Selecting TTML"] } },
            ],
        }"#,
    );
    add_scenario(
        root,
        "TEST_1002_attributes",
        r#"{
            case_name: "attributes",
            completion_marker: "draw done",
            steps: [
                { between: { expected: ["color:red", "font:mono"], marker1: "BEGIN", marker2: "END" } },
            ],
        }"#,
    );

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();
    assert_eq!(scenarios.len(), 2);

    let app = StubApp::new(&log_file, &[true, false]);
    let probes = StubProbes::new(&log_file, &[
        (
            "TEST_1001_selection",
            vec!["onPacketReceived packet=type:WEBVTT_SELECTION", "type:UNMUTE"],
        ),
        (
            "TEST_1002_attributes",
            vec!["BEGIN", "color:red", "END", "font:mono", "draw done"],
        ),
    ]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let records = orchestrator.run_all(&scenarios).await.into_result().unwrap();

    let summary: Vec<(&str, ScenarioStatus)> = records
        .iter()
        .map(|it| (it.case_name.as_str(), it.status))
        .collect();
    assert_eq!(summary, vec![
        ("test_1001", ScenarioStatus::Pass),
        ("attributes", ScenarioStatus::Fail),
    ]);
    assert!(records[1].diagnostic.as_deref().unwrap().contains("font:mono"));

    assert_eq!(orchestrator.supervisor().ensure_calls, 2);
    assert_eq!(orchestrator.supervisor().cleanup_calls, 1);

    let archived = root
        .join("TEST_1001_selection")
        .join("output_files")
        .join("test_1001_subtec.log");
    let archived = std::fs::read_to_string(archived).unwrap();
    assert!(archived.starts_with(READY));
    assert!(archived.contains("type:UNMUTE"));
}

#[tokio::test]
async fn test_earlier_scenario_output_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    add_scenario(
        root,
        "TEST_1001_noisy",
        r#"{ completion_marker: "Philanthropy.", steps: [] }"#,
    );
    add_scenario(
        root,
        "TEST_1002_quiet",
        r#"{
            completion_marker: "quiet done",
            steps: [
                { absent: { forbidden: ["Philanthropy."] } },
                { sequence: { expected: ["quiet done"] } },
            ],
        }"#,
    );

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();
    let app = StubApp::new(&log_file, &[true]);
    let probes = StubProbes::new(&log_file, &[
        ("TEST_1001_noisy", vec!["draw text:[Philanthropy.]"]),
        ("TEST_1002_quiet", vec!["quiet done"]),
    ]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let records = orchestrator.run_all(&scenarios).await.into_result().unwrap();
    assert!(records.iter().all(|it| it.passed()), "{records:?}");

    let first_scenario_end = (READY.len() + "draw text:[Philanthropy.]\n".len()) as u64;
    assert_eq!(orchestrator.checkpoint().offset(), first_scenario_end);
}

#[tokio::test]
async fn test_restart_resets_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    add_scenario(
        root,
        "TEST_1001_long",
        r#"{ completion_marker: "long done", steps: [] }"#,
    );
    add_scenario(
        root,
        "TEST_1002_after_crash",
        r#"{
            completion_marker: "short",
            steps: [ { sequence: { expected: ["subttxrend-app started", "short"] } } ],
        }"#,
    );

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();

    // The app "crashes" between the two scenarios, so the second one starts it again.
    let app = StubApp::new(&log_file, &[true, true]);
    let mut long_output = vec!["padding line that makes the first log long"; 8];
    long_output.push("long done");
    let probes = StubProbes::new(&log_file, &[
        ("TEST_1001_long", long_output),
        ("TEST_1002_after_crash", vec!["short"]),
    ]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let records = orchestrator.run_all(&scenarios).await.into_result().unwrap();

    assert!(records.iter().all(|it| it.passed()), "{records:?}");
    assert_eq!(orchestrator.checkpoint().offset(), 0);
    assert_eq!(
        std::fs::read_to_string(&log_file).unwrap(),
        format!("{READY}short\n")
    );
}

#[tokio::test]
async fn test_missing_probe_source_fails_only_that_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    add_scenario(
        root,
        "TEST_1001_ok",
        r#"{ completion_marker: "ok", steps: [ { sequence: { expected: ["ok"] } } ] }"#,
    );
    let broken = root.join("TEST_1002_no_probe");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(
        broken.join(MANIFEST_FILE_NAME),
        r#"{ completion_marker: "never" }"#,
    )
    .unwrap();

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();
    let app = StubApp::new(&log_file, &[true]);
    let probes = StubProbes::new(&log_file, &[("TEST_1001_ok", vec!["ok"])]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let records = orchestrator.run_all(&scenarios).await.into_result().unwrap();

    assert!(records[0].passed());
    assert_eq!(records[1].status, ScenarioStatus::Fail);
    assert!(records[1].diagnostic.as_deref().unwrap().contains("probe source"));
    assert_eq!(orchestrator.executor().ran(), vec!["TEST_1001_ok".to_string()]);
}

#[tokio::test]
async fn test_app_that_never_starts_aborts_run_and_cleans_up_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for name in ["TEST_1001_a", "TEST_1002_b"] {
        add_scenario(root, name, r#"{ completion_marker: "done" }"#);
    }

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();
    let mut app = StubApp::new(&log_file, &[true, true]);
    app.fail_restarts_from = Some(0);
    let probes = StubProbes::new(&log_file, &[]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let report = orchestrator.run_all(&scenarios).await;

    assert!(matches!(report.fatal, Some(SupervisorError::NotReady { .. })));
    assert!(report.records.is_empty());
    assert!(!report.all_passed());
    assert_eq!(orchestrator.supervisor().ensure_calls, 1);
    assert_eq!(orchestrator.supervisor().cleanup_calls, 1);
    assert!(orchestrator.executor().ran().is_empty());
}

#[tokio::test]
async fn test_results_before_failed_restart_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for name in ["TEST_1001_ok", "TEST_1002_crash", "TEST_1003_never"] {
        add_scenario(
            root,
            name,
            r#"{ completion_marker: "done", steps: [ { sequence: { expected: ["ok"] } } ] }"#,
        );
    }

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();
    let mut app = StubApp::new(&log_file, &[true, true]);
    app.fail_restarts_from = Some(1);
    let probes = StubProbes::new(&log_file, &[("TEST_1001_ok", vec!["ok", "done"])]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let report = orchestrator.run_all(&scenarios).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].case_name, "test_1001");
    assert!(report.records[0].passed());
    assert!(matches!(report.fatal, Some(SupervisorError::NotReady { .. })));
    assert!(!report.all_passed());
    assert_eq!(orchestrator.supervisor().ensure_calls, 2);
    assert_eq!(orchestrator.supervisor().cleanup_calls, 1);
    assert_eq!(orchestrator.executor().ran(), vec!["TEST_1001_ok".to_string()]);
}

#[tokio::test]
async fn test_missing_completion_marker_still_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    add_scenario(
        root,
        "TEST_1001_slow",
        r#"{
            completion_marker: "never logged",
            steps: [ { sequence: { expected: ["first", "second"] } } ],
        }"#,
    );

    let config = config(root);
    let log_file = config.log_file.clone();
    let scenarios = discover_scenarios(root, &ScenarioFilter::default()).unwrap();
    let app = StubApp::new(&log_file, &[true]);
    let probes = StubProbes::new(&log_file, &[("TEST_1001_slow", vec!["first"])]);

    let mut orchestrator = Orchestrator::new(config, app, probes);
    let records = orchestrator.run_all(&scenarios).await.into_result().unwrap();

    assert_eq!(records[0].status, ScenarioStatus::Fail);
    let diagnostic = records[0].diagnostic.clone().unwrap();
    assert!(diagnostic.contains("second"), "{diagnostic}");
}
