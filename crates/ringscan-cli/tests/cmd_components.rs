//! Integration tests for `ringscan components`.
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

#[test]
fn components_group_cyclic_accounts() {
    let out = Command::new(ringscan_bin())
        .args(["components", "-f", "json"])
        .arg(fixture("mixed-network.json"))
        .output()
        .expect("run ringscan components");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("JSON");
    assert_eq!(v["count"], 3);

    let mut groups: Vec<Vec<String>> = v["components"]
        .as_array()
        .expect("array")
        .iter()
        .map(|c| {
            let mut ids: Vec<String> = c
                .as_array()
                .expect("component")
                .iter()
                .map(|id| id.as_str().expect("id").to_owned())
                .collect();
            ids.sort();
            ids
        })
        .collect();
    groups.sort();
    assert_eq!(
        groups,
        vec![
            vec!["acc-01", "acc-02", "acc-03", "acc-04"],
            vec!["acc-05", "acc-06", "acc-07"],
            vec!["acc-08"],
        ]
    );
}

#[test]
fn components_empty_for_acyclic_network() {
    let out = Command::new(ringscan_bin())
        .args(["components", "-f", "json"])
        .arg(fixture("acyclic.json"))
        .output()
        .expect("run ringscan components");
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("JSON");
    assert_eq!(v["count"], 0);
}
