//! Integration tests for the `cyp` CLI surface.

mod common;

use tempfile::TempDir;

fn json_stdout(result: &common::CmdResult) -> serde_json::Value {
    serde_json::from_str(result.stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}); log: {}",
            result.log_path.display()
        )
    })
}

#[test]
fn help_command_prints_usage() {
    let result = common::run_cli_case("help_command_prints_usage", &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: cyp [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let result = common::run_cli_case("version_command_prints_version", &["--version"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("cyp"),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn predict_without_artifact_runs_demo_mode() {
    let result = common::run_cli_case(
        "predict_without_artifact_runs_demo_mode",
        &["predict", "--temperature", "30", "--soil-moisture", "45", "--area", "100"],
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stderr.contains("No model found") && result.stderr.contains("DEMO MODE"),
        "missing demo banner; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Predicted Yield:   1.050 per unit")
            && result.stdout.contains("Total Production:  105.00 units"),
        "unexpected prediction card; log: {}",
        result.log_path.display()
    );
}

#[test]
fn json_mode_outputs_structured_payload() {
    let result = common::run_cli_case(
        "json_mode_outputs_structured_payload",
        &["predict", "--json", "--year", "2025"],
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    let json = json_stdout(&result);
    assert_eq!(json["command"], "predict");
    assert_eq!(json["notice"]["status"], "demo_mode");
    assert_eq!(json["result"]["variant"], "demo");
    let years: Vec<i64> = json["result"]["trend_series"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![2023, 2024, 2025, 2026]);
}

#[test]
fn predict_uses_model_artifact_from_working_directory() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(
        workdir.path().join("crop_yield_model.json"),
        common::CONSTANT_MODEL,
    )
    .unwrap();
    let result = common::run_cli_case_in(
        "predict_uses_model_artifact_from_working_directory",
        &["predict", "--json", "--area", "40"],
        workdir.path(),
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    let json = json_stdout(&result);
    assert_eq!(json["notice"]["status"], "model_loaded");
    assert_eq!(json["result"]["variant"], "model");
    assert_eq!(json["result"]["yield_per_unit"], 2.5);
    assert_eq!(json["result"]["total_production"], 100.0);
}

#[test]
fn corrupt_artifact_falls_back_with_load_failure_notice() {
    let workdir = TempDir::new().unwrap();
    let model = workdir.path().join("broken.json");
    std::fs::write(&model, "{ truncated").unwrap();
    let model_arg = model.display().to_string();
    let result = common::run_cli_case_in(
        "corrupt_artifact_falls_back_with_load_failure_notice",
        &["predict", "--model", model_arg.as_str()],
        workdir.path(),
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stderr.contains("could not be loaded") && !result.stderr.contains("No model found"),
        "expected load-failure banner; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("cyp prediction (demo)"),
        "expected demo prediction; log: {}",
        result.log_path.display()
    );
}

#[test]
fn model_rejecting_row_is_a_hard_error() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(
        workdir.path().join("crop_yield_model.json"),
        r#"{"format_version": 1, "root": {"kind": "numeric", "column": "Rainfall",
            "threshold": 1.0, "below": {"kind": "leaf", "value": 1.0},
            "above": {"kind": "leaf", "value": 2.0}}}"#,
    )
    .unwrap();
    let result = common::run_cli_case_in(
        "model_rejecting_row_is_a_hard_error",
        &["predict"],
        workdir.path(),
    );
    assert!(
        !result.status.success(),
        "expected failure; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stderr.contains("CYP-3002") && !result.stdout.contains("Predicted Yield"),
        "invocation error must not fall back to demo; log: {}",
        result.log_path.display()
    );
}

#[test]
fn district_outside_state_is_rejected() {
    let result = common::run_cli_case(
        "district_outside_state_is_rejected",
        &["predict", "--json", "--state", "Bihar", "--district", "GUNTUR"],
    );
    assert!(
        !result.status.success(),
        "expected failure; log: {}",
        result.log_path.display()
    );
    let json = json_stdout(&result);
    assert_eq!(json["command"], "predict");
    assert_eq!(json["code"], "CYP-2002");
}

#[test]
fn out_of_range_temperature_is_rejected() {
    let result = common::run_cli_case(
        "out_of_range_temperature_is_rejected",
        &["predict", "--temperature", "55"],
    );
    assert!(
        !result.status.success() && result.stderr.contains("CYP-2005"),
        "expected range rejection; log: {}",
        result.log_path.display()
    );
}

#[test]
fn status_reports_demo_mode() {
    let result = common::run_cli_case("status_reports_demo_mode", &["status", "--json"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    let json = json_stdout(&result);
    assert_eq!(json["command"], "status");
    assert_eq!(json["predictor"], "demo");
    assert_eq!(json["notice"]["status"], "demo_mode");
}

#[test]
fn reference_lists_districts_of_state() {
    let result = common::run_cli_case("reference_lists_districts_of_state", &["reference", "Bihar"]);
    assert!(
        result.status.success() && result.stdout.contains("BEGUSARAI"),
        "expected Bihar districts; log: {}",
        result.log_path.display()
    );
    let unknown = common::run_cli_case("reference_unknown_state", &["reference", "Atlantis"]);
    assert!(
        !unknown.status.success() && unknown.stderr.contains("CYP-2001"),
        "expected unknown state; log: {}",
        unknown.log_path.display()
    );
}

#[test]
fn config_file_drives_reference_tables_and_activity_log() {
    let workdir = TempDir::new().unwrap();
    let log_path = workdir.path().join("activity.jsonl");
    let config_path = workdir.path().join("cyp.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[logging]
jsonl_path = "{}"

[reference]
seasons = ["Rabi"]
crops = ["Wheat"]

[[reference.states]]
name = "Punjab"
districts = ["LUDHIANA"]
"#,
            log_path.display()
        ),
    )
    .unwrap();
    let config_arg = config_path.display().to_string();

    let result = common::run_cli_case_in(
        "config_file_drives_reference_tables_and_activity_log",
        &["predict", "--config", config_arg.as_str(), "--json"],
        workdir.path(),
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    let json = json_stdout(&result);
    assert_eq!(json["input"]["state"], "Punjab");
    assert_eq!(json["input"]["district"], "LUDHIANA");
    assert_eq!(json["input"]["crop"], "Wheat");

    let log = std::fs::read_to_string(&log_path).unwrap();
    let events: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "predictor_resolved");
    assert_eq!(events[1]["event"], "prediction_served");
}

#[test]
fn missing_config_file_is_an_error() {
    let result = common::run_cli_case(
        "missing_config_file_is_an_error",
        &["config", "--config", "does-not-exist.toml"],
    );
    assert!(
        !result.status.success() && result.stderr.contains("CYP-1002"),
        "expected missing config error; log: {}",
        result.log_path.display()
    );
}

#[test]
fn completions_command_generates_shell_script() {
    let result = common::run_cli_case(
        "completions_command_generates_shell_script",
        &["completions", "bash"],
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("cyp"),
        "expected completion script contents; log: {}",
        result.log_path.display()
    );
}

#[test]
fn predict_help_describes_selection_flags() {
    let result = common::run_cli_case("predict_help_describes_selection_flags", &["predict", "--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    for needle in ["first state", "first district", "first listed crop", "first season"] {
        assert!(
            result.stdout.contains(needle),
            "missing {needle:?} in help; log: {}",
            result.log_path.display()
        );
    }
}
