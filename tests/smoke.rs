use std::process::Command;

fn cavewar() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cavewar"))
}

#[test]
fn headless_run_reports_identical_terrains() {
    let output = cavewar()
        .args(["--room", "Arena1", "--ticks", "240", "--peers", "3", "--json"])
        .args(["--config", "does/not/exist.toml"])
        .output()
        .expect("run cavewar");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report is json");
    assert_eq!(report["room"], "Arena1");
    assert_eq!(report["seed"], 1986213057);
    assert_eq!(report["converged"], true);
    assert_eq!(report["peers"].as_array().map(Vec::len), Some(3));
}

#[test]
fn event_log_lines_are_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("run").join("events.jsonl");
    let status = cavewar()
        .args(["--room", "room1", "--ticks", "120", "--peers", "2"])
        .arg("--events")
        .arg(&log)
        .status()
        .expect("run cavewar");
    assert!(status.success());

    let contents = std::fs::read_to_string(&log).expect("event log written");
    let mut kinds = std::collections::BTreeSet::new();
    for line in contents.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert!(value["tick"].is_u64());
        kinds.insert(value["kind"].as_str().unwrap_or_default().to_string());
    }
    assert!(kinds.contains("damaged"), "kinds seen: {kinds:?}");
}

#[test]
fn bad_drop_rate_is_rejected() {
    let status = cavewar()
        .args(["--ticks", "1", "--drop-rate", "1.5"])
        .status()
        .expect("run cavewar");
    assert!(!status.success());
}
