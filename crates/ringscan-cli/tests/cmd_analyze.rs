//! Integration tests for `ringscan analyze`.
#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::process::Command;

/// Path to the compiled `ringscan` binary.
fn ringscan_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("ringscan");
    path
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

fn analyze(args: &[&str]) -> std::process::Output {
    Command::new(ringscan_bin())
        .arg("analyze")
        .args(args)
        .env_remove("RINGSCAN_RISK_THRESHOLD")
        .env_remove("RUST_LOG")
        .output()
        .expect("run ringscan analyze")
}

fn json(out: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// analyze: human mode
// ---------------------------------------------------------------------------

#[test]
fn analyze_triangle_exits_0() {
    let out = analyze(&[fixture("triangle-ring.json").to_str().expect("path")]);
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
}

#[test]
fn analyze_triangle_human_output() {
    let out = analyze(&[
        "--no-color",
        fixture("triangle-ring.json").to_str().expect("path"),
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("[HIGH_RISK] A -> B -> C -> A"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("avg_risk=0.817"), "stdout: {stdout}");
    assert!(!stdout.contains('\x1b'), "no ANSI codes expected: {stdout}");
}

#[test]
fn analyze_acyclic_reports_zero_cycles() {
    let out = analyze(&["--no-color", fixture("acyclic.json").to_str().expect("path")]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("cycles: 0 cycles"), "stdout: {stdout}");
}

// ---------------------------------------------------------------------------
// analyze: JSON mode
// ---------------------------------------------------------------------------

#[test]
fn analyze_triangle_json_report() {
    let out = analyze(&[
        "--format",
        "json",
        fixture("triangle-ring.json").to_str().expect("path"),
    ]);
    assert!(out.status.success());
    let v = json(&out);
    assert_eq!(v["cycle_count"], 1);
    assert_eq!(v["high_risk_cycle_count"], 1);
    assert_eq!(v["threshold"], 0.7);
    assert_eq!(v["cycles"][0]["path"], serde_json::json!(["A", "B", "C", "A"]));
    assert_eq!(v["cycles"][0]["classification"], "HIGH_RISK");
    assert_eq!(v["cycles"][0]["total_weight"], 225.0);
    let avg = v["cycles"][0]["average_risk"].as_f64().expect("number");
    assert!((avg - 0.816_666_666_666_666_7).abs() < 1e-9);
    assert_eq!(v["summary"]["total_nodes"], 3);
    assert_eq!(v["summary"]["total_edges"], 3);
    assert_eq!(v["summary"]["high_risk_node_count"], 3);
}

#[test]
fn analyze_acyclic_json_summary() {
    let out = analyze(&["-f", "json", fixture("acyclic.json").to_str().expect("path")]);
    let v = json(&out);
    assert_eq!(v["cycles"], serde_json::json!([]));
    assert_eq!(v["summary"]["total_nodes"], 2);
    assert_eq!(v["summary"]["total_edges"], 1);
    assert_eq!(v["summary"]["high_risk_node_count"], 0);
}

#[test]
fn analyze_mixed_network_classifies_each_cycle() {
    let out = analyze(&["-f", "json", fixture("mixed-network.json").to_str().expect("path")]);
    assert!(out.status.success());
    let v = json(&out);
    let classes: Vec<&str> = v["cycles"]
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["classification"].as_str().expect("string"))
        .collect();
    assert_eq!(classes, vec!["HIGH_RISK", "MONITOR", "MONITOR", "MONITOR"]);
    assert!(v["cycles"][3]["average_risk"].is_null(), "self-loop has no score");
    assert_eq!(v["summary"]["total_nodes"], 9);
    assert_eq!(v["summary"]["total_edges"], 10);
    assert_eq!(v["summary"]["high_risk_node_count"], 4);
    assert_eq!(v["summary"]["total_amount"], 14080.0);
}

// ---------------------------------------------------------------------------
// analyze: flags
// ---------------------------------------------------------------------------

#[test]
fn threshold_flag_reclassifies() {
    let out = analyze(&[
        "-f",
        "json",
        "--threshold",
        "0.85",
        fixture("triangle-ring.json").to_str().expect("path"),
    ]);
    let v = json(&out);
    assert_eq!(v["cycles"][0]["classification"], "MONITOR");
    assert_eq!(v["summary"]["high_risk_node_count"], 1);
}

#[test]
fn threshold_env_var_is_honoured() {
    let out = Command::new(ringscan_bin())
        .args([
            "analyze",
            "-f",
            "json",
            fixture("triangle-ring.json").to_str().expect("path"),
        ])
        .env("RINGSCAN_RISK_THRESHOLD", "0.95")
        .output()
        .expect("run ringscan analyze");
    let v = json(&out);
    assert_eq!(v["threshold"], 0.95);
    assert_eq!(v["high_risk_cycle_count"], 0);
}

#[test]
fn max_cycles_caps_the_report() {
    let out = analyze(&[
        "-f",
        "json",
        "--max-cycles",
        "2",
        fixture("mixed-network.json").to_str().expect("path"),
    ]);
    assert_eq!(json(&out)["cycle_count"], 2);
}

#[test]
fn parallel_mode_reports_same_cycles() {
    let sequential = json(&analyze(&[
        "-f",
        "json",
        fixture("mixed-network.json").to_str().expect("path"),
    ]));
    let parallel = json(&analyze(&[
        "-f",
        "json",
        "--parallel",
        fixture("mixed-network.json").to_str().expect("path"),
    ]));
    assert_eq!(sequential["cycles"], parallel["cycles"]);
}

#[test]
fn fail_on_high_risk_exits_1_after_printing() {
    let out = analyze(&[
        "--fail-on-high-risk",
        "-f",
        "json",
        fixture("triangle-ring.json").to_str().expect("path"),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(json(&out)["cycle_count"], 1);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("1 high-risk cycle"), "stderr: {stderr}");
}

#[test]
fn fail_on_high_risk_passes_clean_input() {
    let out = analyze(&[
        "--fail-on-high-risk",
        fixture("acyclic.json").to_str().expect("path"),
    ]);
    assert_eq!(out.status.code(), Some(0));
}

// ---------------------------------------------------------------------------
// analyze: stdin
// ---------------------------------------------------------------------------

#[test]
fn analyze_reads_stdin() {
    use std::io::Write as _;
    let content = std::fs::read(fixture("triangle-ring.json")).expect("read fixture");
    let mut child = Command::new(ringscan_bin())
        .args(["analyze", "-f", "json", "-"])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .expect("spawn ringscan analyze -");
    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(&content)
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    assert_eq!(json(&out)["cycle_count"], 1);
}
