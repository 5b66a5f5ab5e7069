mod common;

use common::{run_cli, write_world};

#[test]
fn exec_persists_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let store = dir.path().join("store.json");
    let (world, store) = (world.to_str().unwrap(), store.to_str().unwrap());

    let output = run_cli(&[
        "exec", "--world", world, "--store", store, "set-tb", "Arena", "5",
    ]);
    assert!(
        output.status.success(),
        "set-tb should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Banned tile 5 in region Arena."
    );

    let output = run_cli(&["exec", "--world", world, "--store", store, "show", "Arena"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" * Tilebans: 5"), "unexpected show output: {stdout}");
}

#[test]
fn exec_rejected_command_exits_with_policy_code() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let store = dir.path().join("store.json");

    let output = run_cli(&[
        "exec",
        "--world",
        world.to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
        "set-tb",
        "Nowhere",
        "5",
    ]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Invalid region!");
    assert!(!store.exists());
}

#[test]
fn exec_json_replies() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let store = dir.path().join("store.json");

    let output = run_cli(&[
        "exec",
        "--world",
        world.to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
        "--format",
        "json",
        "set-mi",
        "Arena",
        "30",
    ]);
    assert!(output.status.success());
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("each reply is a JSON object"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["kind"], "success");
    assert_eq!(lines[1]["kind"], "warning");
}

#[test]
fn exec_help_reaches_region_pager() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let store = dir.path().join("store.json");

    let output = run_cli(&[
        "exec",
        "--world",
        world.to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
        "--help",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with("RegionTrigger Sub-Commands Instructions (1/"),
        "unexpected help output: {stdout}"
    );
}

#[test]
fn exec_missing_world_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&[
        "exec",
        "--world",
        dir.path().join("absent.yaml").to_str().unwrap(),
        "--store",
        dir.path().join("store.json").to_str().unwrap(),
        "show",
        "Arena",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn simulate_prints_effects() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let store = dir.path().join("store.json");
    let script = dir.path().join("script.yaml");
    let events = dir.path().join("events.jsonl");
    std::fs::write(
        &script,
        r#"
steps:
  - command: "set-e Arena entermsg,pvp"
  - join: { id: 1, name: alice, x: 20, y: 20 }
  - tick: 1
  - move: { id: 1, x: 2, y: 2 }
  - tick: 1
  - toggle_pvp: { id: 1, enabled: false }
"#,
    )
    .unwrap();

    let output = run_cli(&[
        "simulate",
        "--world",
        world.to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
        "--script",
        script.to_str().unwrap(),
        "--events-file",
        events.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "simulate should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#1 alice: message[info] You have entered region Arena"));
    assert!(stdout.contains("#1 alice: pvp on"));
    assert!(stdout.contains("> toggle pvp off by #1: denied"));

    let recorded = std::fs::read_to_string(&events).unwrap();
    assert!(recorded.lines().any(|l| l.contains("\"RegionEntered\"")));
    assert!(recorded.lines().any(|l| l.contains("\"ActionDenied\"")));
}

#[test]
fn version_json() {
    let output = run_cli(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(parsed["name"], "regiontrigger");
}

#[test]
fn completions_generate() {
    let output = run_cli(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("regiontrigger"));
}
