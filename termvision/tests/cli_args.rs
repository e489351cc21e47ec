//! CLI arg handling tests for termvision (client)
use assert_cmd::Command;

fn run(args: &[&str]) -> (bool, Option<i32>, String) {
    let out = Command::cargo_bin("termvision")
        .expect("termvision binary")
        .args(args)
        .output()
        .expect("run termvision");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    (out.status.success(), out.status.code(), text)
}

#[test]
fn test_help_mentions_short_and_long_flags() {
    let (ok, _, text) = run(&["--help"]);
    assert!(ok, "--help should exit successfully\n{text}");
    assert!(
        text.contains("--tls-ca")
            && text.contains("-t")
            && text.contains("--profile")
            && text.contains("-P")
            && text.contains("--interval")
            && text.contains("-i"),
        "help text missing expected flags\n{text}"
    );
}

#[test]
fn test_help_combined_with_other_flags_succeeds() {
    for args in [
        &["--tls-ca", "/tmp/cert.pem", "--help"][..],
        &["-t", "/tmp/cert.pem", "--help"][..],
        &["--profile", "dev", "--help"][..],
        &["-i", "500", "--help"][..],
    ] {
        let (ok, _, text) = run(args);
        assert!(ok, "termvision {args:?} did not succeed");
        assert!(text.contains("Usage:"));
    }
}

#[test]
fn test_invalid_interval_is_rejected() {
    let (ok, code, text) = run(&["--interval", "0", "ws://127.0.0.1:1/ws", "--dry-run"]);
    assert!(!ok);
    assert_eq!(code, Some(2));
    assert!(text.contains("Invalid interval"), "{text}");
}

#[test]
fn test_non_websocket_url_is_rejected() {
    let td = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("termvision")
        .unwrap()
        .env("XDG_CONFIG_HOME", td.path())
        .args(["http://example/ws", "--dry-run"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_dry_run_reports_resolved_endpoint() {
    let td = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("termvision")
        .unwrap()
        .env("XDG_CONFIG_HOME", td.path())
        .args(["-i", "250", "ws://127.0.0.1:9/ws", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("url=ws://127.0.0.1:9/ws"), "{text}");
    assert!(text.contains("interval_ms=250"), "{text}");
}

#[test]
fn test_no_args_falls_back_to_default_endpoint() {
    let td = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("termvision")
        .unwrap()
        .env("XDG_CONFIG_HOME", td.path())
        .arg("--dry-run")
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("url=wss://localhost:8765/ws"), "{text}");
    assert!(text.contains("interval_ms=1000"), "{text}");
}
