// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests driving the compiled `mahmock` binary.

use std::io::Write;
use std::process::Command;

fn mahmock() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mahmock"))
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn check_config_accepts_valid_file() {
    let file = config_file("[server]\nport = 9100\n\n[feed]\nenabled = true\ncount = 2\n");
    let output = mahmock()
        .args(["check-config", "--config"])
        .arg(file.path())
        .output()
        .expect("run mahmock");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("configuration OK"));
    assert!(stdout.contains("9100"));
    assert!(stdout.contains("2 events"));
}

#[test]
fn check_config_rejects_unknown_key_with_status_1() {
    let file = config_file("[server]\nverfy_key = \"x\"\n");
    let output = mahmock()
        .args(["check-config", "--config"])
        .arg(file.path())
        .output()
        .expect("run mahmock");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("verfy_key"), "stderr: {stderr}");
}

#[test]
fn check_config_rejects_missing_file() {
    let output = mahmock()
        .args(["check-config", "--config", "/nonexistent/mahmock.toml"])
        .output()
        .expect("run mahmock");
    assert_eq!(output.status.code(), Some(1));
}
