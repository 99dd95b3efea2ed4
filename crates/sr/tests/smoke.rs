use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::path::Path;

fn sr() -> Command {
    let mut cmd = Command::cargo_bin("sr").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn frame(dir: &Path, name: &str, px: [u8; 3]) {
    RgbImage::from_pixel(2, 2, Rgb(px)).save(dir.join(name)).unwrap();
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn help_lists_modes() {
    sr().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--window-title"));
}

#[test]
fn comparison_writes_diffs() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    frame(a.path(), "000_0000_after_launch.png", [10, 10, 10]);
    frame(b.path(), "000_0000_after_launch.png", [20, 10, 10]);

    let output = sr()
        .args(["--mode", "comparison", "--inputs"])
        .arg(a.path())
        .arg(b.path())
        .arg("--output")
        .arg(out.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["written"].as_array().unwrap().len(), 1);
    assert!(out.path().join("000_0000_after_launch_diff.png").is_file());
}

#[test]
fn comparison_without_shared_frames_fails() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    frame(a.path(), "a.png", [0, 0, 0]);
    frame(b.path(), "b.png", [0, 0, 0]);

    sr().args(["--mode", "comparison", "--inputs"])
        .arg(a.path())
        .arg(b.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("NO_MATCHING_FRAMES"));
}

#[test]
fn comparison_needs_two_inputs() {
    let a = tempfile::tempdir().unwrap();
    sr().args(["--mode", "comparison", "--inputs"])
        .arg(a.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("INVALID_ARGUMENT"));
}

#[test]
fn comparison_requires_output() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    frame(a.path(), "000_0000_after_launch.png", [10, 10, 10]);
    frame(b.path(), "000_0000_after_launch.png", [20, 10, 10]);

    sr().current_dir(a.path())
        .args(["--mode", "comparison", "--inputs"])
        .arg(a.path())
        .arg(b.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("INVALID_ARGUMENT"))
        .stdout(predicate::str::contains("--output"));
    assert!(!a.path().join("screenshots").exists());
}

#[test]
fn interactive_lists_matched_frames() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    frame(a.path(), "001_0000_mouse_press_left.png", [0, 0, 0]);
    frame(b.path(), "001_0000_mouse_press_left.png", [0, 0, 0]);
    frame(b.path(), "002_0001_exit.png", [0, 0, 0]);

    let output = sr()
        .args(["--mode", "interactive", "--inputs"])
        .arg(a.path())
        .arg(b.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    let frames = json["data"].as_array().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["name"], "001_0000_mouse_press_left.png");
    assert!(frames[0]["diff"].is_null());
}

#[test]
fn script_mode_requires_script() {
    sr().args(["--mode", "script", "--exe", "/bin/true"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("INVALID_ARGUMENT"));
}

#[test]
fn unreadable_transcript_fails_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    sr().args(["--script"])
        .arg(dir.path().join("missing.txt"))
        .args(["--exe", "/bin/true", "--output"])
        .arg(dir.path().join("shots"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("TRANSCRIPT_UNREADABLE"));
}

#[test]
fn negative_durations_are_rejected() {
    sr().args(["--launch-wait", "-1"]).assert().failure();
}

#[test]
fn logs_stay_off_stdout() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    frame(a.path(), "x.png", [1, 2, 3]);
    frame(b.path(), "x.png", [3, 2, 1]);

    let output = sr()
        .args(["--log-level", "debug", "--mode", "comparison", "--inputs"])
        .arg(a.path())
        .arg(b.path())
        .arg("--output")
        .arg(out.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    stdout_json(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("wrote diff frame"));
}
