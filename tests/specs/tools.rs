// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The auxiliary subcommands: filelog, viewlog, flowscript.

use crate::prelude::{shellflow_binary, Workspace};
use std::io::Write;
use std::process::{Command, Stdio};

#[test]
fn filelog_writes_fingerprint_json() {
    let ws = Workspace::new();
    ws.write("data.txt", "foo");

    ws.shellflow_ok(&["filelog", "--output", "out.json", "data.txt"]);

    let logs: serde_json::Value = serde_json::from_str(&ws.read("out.json")).unwrap();
    let entry = &logs.as_array().unwrap()[0];
    assert_eq!(entry["rel_path"], "data.txt");
    assert_eq!(entry["size"], 3);
    assert_eq!(
        entry["sha256"],
        "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
    );

    // the shared digest cache appeared beside the logs
    assert!(ws.exists("shellflow-wf/files.sqlite3"));
}

#[test]
fn filelog_skip_sha_records_stat_only() {
    let ws = Workspace::new();
    ws.write("data.txt", "foo");

    ws.shellflow_ok(&["filelog", "--skip-sha", "--output", "out.json", "data.txt"]);

    let logs: serde_json::Value = serde_json::from_str(&ws.read("out.json")).unwrap();
    assert_eq!(logs.as_array().unwrap()[0]["sha256"], "");
}

#[test]
fn filelog_to_stdout() {
    let ws = Workspace::new();
    ws.write("data.txt", "foo");

    let stdout = ws.shellflow_ok(&["filelog", "data.txt"]);
    assert!(stdout.contains("\"rel_path\": \"data.txt\""));
}

#[test]
fn filelog_missing_file_fails() {
    let ws = Workspace::new();
    let output = ws.shellflow(&["filelog", "nope.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn viewlog_summarizes_past_runs() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");
    ws.shellflow_ok(&["run", "flow.sf"]);

    let stdout = ws.shellflow_ok(&["viewlog"]);
    assert!(stdout.contains("|Success|Failed|Running|Pending|File Changed|"));
    assert!(stdout.contains("flow.sf"));
    assert!(stdout.contains("   Done"), "stdout: {}", stdout);

    // detail view by run number
    let detail = ws.shellflow_ok(&["viewlog", "1"]);
    assert!(detail.contains("---- Job: 1 ------------"));
    assert!(detail.contains("Script: cat hoge > foo"));
    assert!(detail.contains("Reusable: Yes"));
}

#[test]
fn viewlog_marks_failed_runs() {
    let ws = Workspace::new();
    ws.write("flow.sf", "bash -c 'echo nope >&2; exit 3' > [[x]]\n");
    let output = ws.shellflow(&["run", "flow.sf"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = ws.shellflow_ok(&["viewlog", "--failed"]);
    assert!(stdout.contains(" Failed"), "stdout: {}", stdout);

    let detail = ws.shellflow_ok(&["viewlog", "--failed", "1"]);
    assert!(detail.contains("State: Failed"));
    assert!(detail.contains("Exit code: 3"));
    // the first lines of the failing script's stderr are inlined
    assert!(detail.contains("  nope"));
}

#[test]
fn viewlog_with_no_runs_prints_only_the_header() {
    let ws = Workspace::new();
    let stdout = ws.shellflow_ok(&["viewlog"]);
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn flowscript_repl_evaluates_lines() {
    let ws = Workspace::new();
    let mut child = Command::new(shellflow_binary())
        .arg("flowscript")
        .current_dir(ws.path())
        .env("HOME", ws.path().join("home"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"1 + 2 * 3\nbasename(\"/a/b.c\")\nnope\nexit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('7'), "stdout: {}", stdout);
    assert!(stdout.contains("\"b.c\""), "stdout: {}", stdout);
    assert!(stdout.contains("Error:"), "stdout: {}", stdout);
}

#[test]
fn unknown_workflow_file_is_an_engine_error() {
    let ws = Workspace::new();
    let output = ws.shellflow(&["run", "missing.sf"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn help_lists_the_subcommands() {
    let ws = Workspace::new();
    let stdout = ws.shellflow_ok(&["--help"]);
    for name in ["run", "dot", "filelog", "viewlog", "flowscript"] {
        assert!(stdout.contains(name), "help misses {}", name);
    }
}
