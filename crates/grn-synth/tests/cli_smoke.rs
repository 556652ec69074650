use std::fs;
use std::process::Command;

use serde_json::Value;

const MODEL: &str = r#"{
  "network": { "species": [{ "name": "cA", "max": 1 }] },
  "property": { "series": { "measurements": ["cA=0", "cA=1"] } }
}"#;

#[test]
fn stats_reports_the_constructed_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    fs::write(&model, MODEL).unwrap();

    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "grn-synth", "--", "stats", "--model"])
        .arg(&model)
        .output()
        .expect("run grn-synth stats");
    assert!(output.status.success());
    let body = String::from_utf8(output.stdout).expect("utf8");
    let value: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(value["parametrization_space"], 2);
    assert_eq!(value["uts_states"], 2);
    assert_eq!(value["product_states"], 6);
    assert!(value["digest"].as_str().is_some_and(|d| d.len() == 64));
}

#[test]
fn synth_writes_the_result_stream() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    fs::write(&model, MODEL).unwrap();
    let results = dir.path().join("results.txt");

    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "grn-synth", "--", "synth", "--robustness", "--model"])
        .arg(&model)
        .arg("--output")
        .arg(&results)
        .output()
        .expect("run grn-synth synth");
    assert!(output.status.success());
    let body = fs::read_to_string(&results).unwrap();
    assert_eq!(body.trim(), "1:(1):0.5:");
}

#[test]
fn shipped_yaml_model_synthesises() {
    let model = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/mutual_activation.yaml");
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "grn-synth", "--", "synth", "--model", model])
        .output()
        .expect("run grn-synth synth");
    assert!(output.status.success());
    let body = String::from_utf8(output.stdout).expect("utf8");
    // the high corner is reachable for 7 of the 16 parametrizations
    assert_eq!(body.lines().count(), 7);
}

#[test]
fn malformed_models_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    fs::write(&model, r#"{ "network": { "species": [] } }"#).unwrap();

    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "grn-synth", "--", "stats", "--model"])
        .arg(&model)
        .output()
        .expect("run grn-synth stats");
    assert!(!output.status.success());
}
