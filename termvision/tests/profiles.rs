//! Tests for profile load/save and resolution logic (non-interactive paths only)
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

// Each test gets its own config dir passed to the child process, so no global env is mutated.
fn run_termvision(config_home: &Path, args: &[&str]) -> (bool, String) {
    let exe = env!("CARGO_BIN_EXE_termvision");
    let output = Command::new(exe)
        .env("XDG_CONFIG_HOME", config_home)
        .args(args)
        .output()
        .expect("run termvision");
    let ok = output.status.success();
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (ok, text)
}

fn profiles_path(config_home: &Path) -> PathBuf {
    config_home.join("termvision").join("profiles.json")
}

#[test]
fn test_profile_created_on_first_use() {
    let td = tempfile::tempdir().unwrap();
    let (ok, out) = run_termvision(td.path(), &["--profile", "unittest", "ws://example:1/ws", "--dry-run"]);
    assert!(ok, "{out}");
    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    assert!(
        data.contains("unittest"),
        "profiles.json missing profile entry: {data}"
    );
}

#[test]
fn test_profile_overwrite_only_when_changed() {
    let td = tempfile::tempdir().unwrap();
    let (_ok, _out) = run_termvision(td.path(), &["--profile", "prod", "ws://one/ws", "--dry-run"]);
    let first = fs::read_to_string(profiles_path(td.path())).unwrap();
    // Re-run identical (should not duplicate or corrupt)
    let (_ok2, _out2) = run_termvision(td.path(), &["--profile", "prod", "ws://one/ws", "--dry-run"]);
    let second = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, second, "Profile file changed despite identical input");
    // Changed without --save: stdin is closed, so the prompt declines
    let (_ok3, _out3) = run_termvision(td.path(), &["--profile", "prod", "ws://two/ws", "--dry-run"]);
    let third = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, third);
    // Overwrite with different URL using --save (no prompt path)
    let (_ok4, _out4) = run_termvision(td.path(), &["--profile", "prod", "--save", "ws://two/ws", "--dry-run"]);
    let fourth = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(fourth.contains("two"), "Updated URL not written: {fourth}");
}

#[test]
fn test_profile_tls_ca_and_interval_persisted() {
    let td = tempfile::tempdir().unwrap();
    let (_ok, _out) = run_termvision(
        td.path(),
        &[
            "--profile",
            "secureX",
            "--tls-ca",
            "/tmp/cert.pem",
            "--interval",
            "500",
            "wss://host/ws",
            "--dry-run",
        ],
    );
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("secureX"));
    assert!(data.contains("cert.pem"));
    assert!(data.contains("\"poll_interval_ms\": 500"), "{data}");
}

#[test]
fn test_saved_profile_is_loaded_by_name() {
    let td = tempfile::tempdir().unwrap();
    run_termvision(td.path(), &["-P", "lab", "-i", "750", "ws://lab:8765/ws", "--dry-run"]);
    let (ok, out) = run_termvision(td.path(), &["-P", "lab", "--dry-run"]);
    assert!(ok, "{out}");
    assert!(out.contains("url=ws://lab:8765/ws"), "{out}");
    assert!(out.contains("interval_ms=750"), "{out}");
}
