//! Integration tests for the squeeze binary.
//!
//! These tests verify end-to-end behavior including:
//! - Human and JSON output of both strategies
//! - Config file resolution and overrides
//! - CSV and JSON export
//! - Unusable plans and missing targets

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI with an isolated config home
fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("squeeze"));
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

/// Write a plan file and return its path
fn write_plan(dir: &Path, plan: serde_json::Value) -> PathBuf {
    let path = dir.join("plan.json");
    fs::write(&path, plan.to_string()).expect("Failed to write plan");
    path
}

fn leg_day() -> serde_json::Value {
    serde_json::json!({
        "id": "leg-plan",
        "targetMinutes": 30,
        "sessions": [{
            "id": "legs",
            "exercises": [
                { "id": "squat", "name": "Back Squat", "sets": 5, "reps": 5,
                  "equipment": "barbell", "primaryMuscleGroup": "quads" },
                { "id": "curl", "name": "Leg Curl", "sets": 3, "reps": 10,
                  "equipment": "machine", "primaryMuscleGroup": "hamstrings" },
                { "id": "calf", "name": "Calf Raise", "sets": 3, "reps": 12,
                  "equipment": "dumbbell", "primaryMuscleGroup": "calves" }
            ]
        }]
    })
}

fn run_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout should be JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Compress training sessions to fit a time budget",
        ));
}

#[test]
fn test_compress_human_output() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());

    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("SESSION legs"))
        .stdout(predicate::str::contains("core_lift"))
        .stdout(predicate::str::contains("Leg Curl ×3 + Calf Raise ×3"))
        .stdout(predicate::str::contains("Fits the time budget"))
        .stdout(predicate::str::contains("1 of 1 session(s) fit 30 min"));
}

#[test]
fn test_compress_json_output() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());

    let outcome = run_json(cli(temp_dir.path()).arg("compress").arg(&plan).arg("--json"));

    assert_eq!(outcome["plan_id"], "leg-plan");
    assert_eq!(outcome["meets_time_constraint"], true);
    let segments = outcome["sessions"][0]["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0]["kind"], "core_lift");
    assert_eq!(segments[0]["id"], "core:squat");
    assert_eq!(segments[1]["kind"], "accessory_superset");
    assert_eq!(
        outcome["sessions"][0]["summary"]["compressed_duration_seconds"],
        838
    );
}

#[test]
fn test_target_flag_overrides_plan() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());

    let outcome = run_json(
        cli(temp_dir.path())
            .arg("compress")
            .arg(&plan)
            .arg("--target-minutes")
            .arg("10")
            .arg("--json"),
    );

    assert_eq!(outcome["summary"]["target_minutes"], 10);
    assert_eq!(outcome["meets_time_constraint"], false);
}

#[test]
fn test_missing_target_fails() {
    let temp_dir = setup_test_dir();
    let mut plan = leg_day();
    plan.as_object_mut().unwrap().remove("targetMinutes");
    let plan = write_plan(temp_dir.path(), plan);

    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no target"));
}

#[test]
fn test_unusable_plan_is_not_an_error() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), serde_json::json!({ "name": "empty" }));

    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .arg("--target-minutes")
        .arg("30")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to compress"));
}

#[test]
fn test_invalid_json_fails() {
    let temp_dir = setup_test_dir();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    cli(temp_dir.path())
        .arg("compress")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_config_file_caps_core_lift() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());
    let config = temp_dir.path().join("squeeze.toml");
    fs::write(&config, "core_lift_max_sets = 2\n").unwrap();

    let outcome = run_json(
        cli(temp_dir.path())
            .arg("compress")
            .arg(&plan)
            .arg("--config")
            .arg(&config)
            .arg("--json"),
    );

    let core = &outcome["sessions"][0]["segments"][0];
    assert_eq!(core["exercise"]["sets"].as_array().unwrap().len(), 2);
}

#[test]
fn test_flag_overrides_config_file() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());
    let config = temp_dir.path().join("squeeze.toml");
    fs::write(&config, "core_lift_max_sets = 2\n").unwrap();

    let outcome = run_json(
        cli(temp_dir.path())
            .arg("compress")
            .arg(&plan)
            .arg("--config")
            .arg(&config)
            .arg("--core-lift-max-sets")
            .arg("1")
            .arg("--json"),
    );

    let core = &outcome["sessions"][0]["segments"][0];
    assert_eq!(core["exercise"]["sets"].as_array().unwrap().len(), 1);
}

#[cfg(target_os = "linux")]
#[test]
fn test_user_config_path_is_used() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());
    let config_dir = temp_dir.path().join("config").join("squeeze");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "core_lift_max_sets = 3\n").unwrap();

    let outcome = run_json(cli(temp_dir.path()).arg("compress").arg(&plan).arg("--json"));

    let core = &outcome["sessions"][0]["segments"][0];
    assert_eq!(core["exercise"]["sets"].as_array().unwrap().len(), 3);
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());
    let config = temp_dir.path().join("squeeze.toml");
    fs::write(&config, "max_block_exercises = 1\n").unwrap();

    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_block_exercises"));
}

#[test]
fn test_csv_and_json_export() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());
    let csv_path = temp_dir.path().join("out").join("segments.csv");
    let json_path = temp_dir.path().join("out").join("outcome.json");

    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .arg("--csv")
        .arg(&csv_path)
        .arg("--out")
        .arg(&json_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 2 segment rows"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.starts_with("session_id,order,segment_id"));
    assert!(csv_content.contains("core:squat"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(saved["plan_id"], "leg-plan");
}

#[test]
fn test_trim_strategy() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(
        temp_dir.path(),
        serde_json::json!({ "sessions": [{ "id": "s", "exercises": [
            { "id": "squat", "name": "Back Squat", "sets": 5 },
            { "id": "curl", "name": "Leg Curl", "sets": 4 }
        ]}]}),
    );

    // 5×180 + 4×120 = 1380s against a 600s budget
    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .arg("--target-minutes")
        .arg("10")
        .arg("--strategy")
        .arg("trim")
        .assert()
        .success()
        .stdout(predicate::str::contains("dropped curl"))
        .stdout(predicate::str::contains("Back Squat ×3"));

    let results = run_json(
        cli(temp_dir.path())
            .arg("compress")
            .arg(&plan)
            .arg("--target-minutes")
            .arg("10")
            .arg("--strategy")
            .arg("trim")
            .arg("--json"),
    );
    assert_eq!(results[0]["estimated_seconds"], 540);
    assert_eq!(results[0]["meets_target"], true);
}

#[test]
fn test_trim_strategy_rejects_export() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path(), leg_day());

    cli(temp_dir.path())
        .arg("compress")
        .arg(&plan)
        .arg("--strategy")
        .arg("trim")
        .arg("--csv")
        .arg(temp_dir.path().join("x.csv"))
        .assert()
        .failure();
}

#[test]
fn test_defaults_prints_toml() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("core_lift_max_sets = 4"))
        .stdout(predicate::str::contains("max_block_exercises = 4"));
}
