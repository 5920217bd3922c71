use std::fs;
use std::process::Command;

use serde_json::Value;

const DATA: &str = "tests/fixtures/lineage";

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_roguelike-lineage"))
        .args(args)
        .output()
        .expect("Failed to execute roguelike-lineage")
}

#[test]
fn writes_layout_document() {
    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = output_dir.path().join("layout.json");

    let output = run(&[
        "layout",
        "--data",
        DATA,
        "--output",
        output_path.to_str().unwrap(),
        "--config",
        "tests/fixtures/layout.yaml",
        "--max-iterations",
        "200",
        "--immediate",
    ]);
    assert!(output.status.success(), "roguelike-lineage exited with error");

    let doc: Value =
        serde_json::from_str(&fs::read_to_string(&output_path).expect("layout.json not written"))
            .expect("layout.json is not JSON");

    assert_eq!(doc["years"]["min"], 1974);
    assert_eq!(doc["years"]["max"], 1996);

    // Six interlinked games never pass the per-pair convergence test
    assert_eq!(doc["outcome"]["status"], "iteration_cap");
    assert_eq!(doc["outcome"]["steps"], 200);

    let nodes = doc["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 6);
    for node in nodes {
        assert!(node["x"].as_f64().unwrap().is_finite());
        assert!(node["y"].as_f64().unwrap().is_finite());
    }
    assert_eq!(doc["links"].as_array().unwrap().len(), 7);

    let missing: Vec<&str> = doc["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["to"].as_str().unwrap())
        .collect();
    assert_eq!(missing, ["Omega"]);

    let below = doc["arcs"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["side"] == "below")
        .count();
    assert_eq!(below, 4);
}

#[test]
fn same_seed_gives_same_layout() {
    let args = [
        "layout",
        "--data",
        DATA,
        "--seed",
        "11",
        "--max-iterations",
        "50",
        "--immediate",
    ];
    let first = run(&args);
    let second = run(&args);

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn prints_year_axis() {
    let output = run(&["years", "--data", DATA]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 23);
    assert_eq!(lines[0], "1974\t5.00\t0.0");
    assert_eq!(lines[22], "1996\t91.09\t360.0");
}

#[test]
fn timeline_marks_selected_game() {
    let output = run(&["timeline", "--data", DATA, "--select", "Rogue"]);
    assert!(output.status.success());

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["selection"]["title"], "Rogue");
    assert_eq!(doc["year_labels"].as_array().unwrap().len(), 23);
}

#[test]
fn unknown_selection_fails() {
    let output = run(&["timeline", "--data", DATA, "--select", "Spelunky"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown game 'Spelunky'"), "{stderr}");
}

#[test]
fn missing_data_directory_fails() {
    let output = run(&["years", "--data", "tests/fixtures/nowhere"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load data"), "{stderr}");
}

#[test]
fn zero_frame_interval_is_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("layout.yaml");
    fs::write(&config, "frame_interval_ms: 0\n").expect("Failed to write config");

    let output = run(&["layout", "--data", DATA, "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("frame_interval_ms must be at least 1"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}
