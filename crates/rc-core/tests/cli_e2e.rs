//! End-to-end CLI tests against the shared fixtures.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn rc_core() -> Command {
    let mut cmd = cargo_bin_cmd!("rc-core");
    // Keep host config out of the resolution chain.
    cmd.env_remove("RC_SAMPLING")
        .env("RC_CONFIG_DIR", "/nonexistent/rc-config")
        .env("XDG_CONFIG_HOME", "/nonexistent/xdg")
        .env("RC_LOG", "off");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../test/fixtures")
        .join(name)
}

fn simulate_args() -> Vec<String> {
    vec![
        "simulate".into(),
        "--ontology".into(),
        fixture("ontology.json").display().to_string(),
        "--annotations".into(),
        fixture("annotations.json").display().to_string(),
    ]
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("run rc-core");
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ============================================================================
// simulate
// ============================================================================

#[test]
fn simulate_json_run() {
    let json = stdout_json(
        rc_core()
            .args(simulate_args())
            .args(["-n", "4", "--seed", "17", "--preset", "ideal"]),
    );

    assert_eq!(json["seed"], 17);
    assert_eq!(json["config"]["preset"], "ideal");
    assert!(json["run_id"].as_str().unwrap().starts_with("run-"));
    let cohorts = json["cohorts"].as_array().unwrap();
    assert_eq!(cohorts.len(), 2);
    for cohort in cohorts {
        assert_eq!(cohort["patients"].as_array().unwrap().len(), 4);
    }
    assert_eq!(json["summary"]["patients_generated"], 8);
}

#[test]
fn simulate_is_reproducible() {
    let run = |seed: &str| {
        let mut json = stdout_json(
            rc_core()
                .args(simulate_args())
                .args(["-n", "3", "--seed", seed]),
        );
        json["cohorts"].take()
    };
    assert_eq!(run("5"), run("5"));
}

#[test]
fn simulate_single_disease_jsonl() {
    let output = rc_core()
        .args(simulate_args())
        .args(["-n", "6", "--seed", "1", "--disease", "orpha:558", "-f", "jsonl"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    for line in lines {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["disease_id"], "ORPHA:558");
        assert!(!record["phenotype"].as_array().unwrap().is_empty());
    }
}

#[test]
fn simulate_phenopackets() {
    let json = stdout_json(
        rc_core()
            .args(simulate_args())
            .args(["-n", "2", "--seed", "3", "-f", "phenopacket"]),
    );
    let packets = json.as_array().unwrap();
    assert_eq!(packets.len(), 4);
    assert_eq!(packets[0]["metaData"]["submittedBy"], "patient sampler");
    assert_eq!(packets[0]["metaData"]["resources"][0]["id"], "hp");
    assert!(packets[0]["phenotypicFeatures"][0]["type"]["id"]
        .as_str()
        .unwrap()
        .starts_with("HP:"));
}

#[test]
fn unknown_disease_is_partial_run() {
    rc_core()
        .args(simulate_args())
        .args(["-n", "2", "--seed", "1", "--disease", "ORPHA:558,ORPHA:0"])
        .args(["-f", "summary"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ORPHA:0"))
        .stdout(predicate::str::contains("skipped"));
}

#[test]
fn simulate_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run.json");
    rc_core()
        .args(simulate_args())
        .args(["-n", "1", "--seed", "2", "--output"])
        .arg(&out)
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["schema_version"], "1.0.0");
}

#[test]
fn missing_ontology_is_io_error() {
    rc_core()
        .args([
            "simulate",
            "--ontology",
            "/nonexistent/ontology.json",
            "--annotations",
        ])
        .arg(fixture("annotations.json"))
        .args(["-f", "summary"])
        .assert()
        .code(21)
        .stderr(predicate::str::contains("I/O Error"));
}

#[test]
fn invalid_config_is_config_error() {
    rc_core()
        .args(simulate_args())
        .arg("--config")
        .arg(fixture("config/sampling_bad_noise.json"))
        .assert()
        .code(12);
}

#[test]
fn invalid_config_logs_config_error_event() {
    rc_core()
        .env_remove("RUST_LOG")
        .env("RC_LOG", "info")
        .env("RC_LOG_FORMAT", "jsonl")
        .args(simulate_args())
        .arg("--config")
        .arg(fixture("config/sampling_bad_noise.json"))
        .assert()
        .code(12)
        .stderr(predicate::str::contains(r#""event":"config.error""#))
        .stderr(predicate::str::contains(r#""stage":"load""#));
}

#[test]
fn unknown_preset_is_usage_error() {
    rc_core()
        .args(simulate_args())
        .args(["--preset", "perfect"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("perfect"));
}

// ============================================================================
// presets / check / ontology / version
// ============================================================================

#[test]
fn presets_lists_all() {
    let json = stdout_json(rc_core().arg("presets"));
    let names: Vec<&str> = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["default", "ideal", "freqs", "impre", "impre2"]);
}

#[test]
fn check_fixtures_ok() {
    let json = stdout_json(
        rc_core()
            .arg("check")
            .arg("--ontology")
            .arg(fixture("ontology.json"))
            .arg("--annotations")
            .arg(fixture("annotations.json")),
    );
    assert_eq!(json["ok"], true);
    assert_eq!(json["checks"].as_array().unwrap().len(), 3);
}

#[test]
fn check_bad_config_fails() {
    rc_core()
        .arg("check")
        .arg("--config")
        .arg(fixture("config/sampling_bad_dx.json"))
        .assert()
        .code(12)
        .stdout(predicate::str::contains("\"ok\": false"));
}

#[test]
fn ontology_ancestors_query() {
    let json = stdout_json(
        rc_core()
            .args(["ontology", "ancestors", "--ontology"])
            .arg(fixture("ontology.json"))
            .args(["HP:0011003", "--depth", "2"]),
    );
    let ids: Vec<&str> = json["terms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["HP:0000478", "HP:0000545"]);
}

#[test]
fn ontology_simplify_query() {
    rc_core()
        .args(["ontology", "simplify", "--ontology"])
        .arg(fixture("ontology.json"))
        .args(["HP:0000545", "HP:0011003", "HP:0000707", "-f", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HP:0011003\tHigh myopia"))
        .stdout(predicate::str::contains("HP:0000707"))
        .stdout(predicate::str::contains("HP:0000545").not());
}

#[test]
fn version_json() {
    let json = stdout_json(rc_core().arg("version"));
    assert_eq!(json["rc_core_version"], env!("CARGO_PKG_VERSION"));
}
