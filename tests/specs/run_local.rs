// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local sequential execution end to end.

use crate::prelude::Workspace;

const COPY_CHAIN: &str =
    "cat ((hoge)) > [[foo]]\ncat ((foo)) > [[bar]]\ncat ((foo)) ((hoge)) > [[bar2]]\n";

#[test]
fn copy_chain_produces_every_file() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", COPY_CHAIN);

    let stdout = ws.shellflow_ok(&["run", "flow.sf"]);
    assert!(stdout.contains("Workflow Log:"));

    assert_eq!(ws.read("foo"), "foo");
    assert_eq!(ws.read("bar"), "foo");
    assert_eq!(ws.read("bar2"), "foofoo");

    let runs = ws.run_dirs();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];

    for job in ["job001", "job002", "job003"] {
        let job_dir = run.join(job);
        assert_eq!(
            std::fs::read_to_string(job_dir.join("rc")).unwrap().trim(),
            "0",
            "rc of {}",
            job
        );
        assert!(job_dir.join("script.sh").exists());
        assert!(job_dir.join("run.sh").exists());
        assert!(job_dir.join("input.json").exists());
        assert!(job_dir.join("output.json").exists());
        assert!(job_dir.join("local-run-pid.txt").exists());
    }
}

#[test]
fn runtime_metadata_records_the_task_graph() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", COPY_CHAIN);
    ws.shellflow_ok(&["run", "flow.sf"]);

    let runs = ws.run_dirs();
    let runtime = ws.runtime(&runs[0]);

    let tasks = runtime["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0]["id"], 1);
    assert_eq!(tasks[1]["dependent_task_ids"], serde_json::json!([1]));
    assert_eq!(tasks[2]["dependent_task_ids"], serde_json::json!([1]));
    assert_eq!(
        tasks[2]["dependent_files"],
        serde_json::json!(["foo", "hoge"])
    );
    assert_eq!(runtime["workflow"], serde_json::json!(COPY_CHAIN));

    // top-level inputs are the files nothing creates
    let inputs: serde_json::Value =
        serde_json::from_slice(&std::fs::read(runs[0].join("input.json")).unwrap()).unwrap();
    let input_names: Vec<&str> = inputs
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["rel_path"].as_str().unwrap())
        .collect();
    assert_eq!(input_names, ["hoge"]);
}

#[test]
fn job_file_logs_record_digests() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");
    ws.shellflow_ok(&["run", "flow.sf"]);

    let run = &ws.run_dirs()[0];
    let inputs: serde_json::Value =
        serde_json::from_slice(&std::fs::read(run.join("job001/input.json")).unwrap()).unwrap();
    let entry = &inputs.as_array().unwrap()[0];
    assert_eq!(entry["rel_path"], "hoge");
    assert_eq!(entry["size"], 3);
    // sha256 of "foo"
    assert_eq!(
        entry["sha256"],
        "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
    );

    let outputs: serde_json::Value =
        serde_json::from_slice(&std::fs::read(run.join("job001/output.json")).unwrap()).unwrap();
    assert_eq!(outputs.as_array().unwrap()[0]["rel_path"], "foo");
}

#[test]
fn failing_task_reports_stderr_and_abandons_the_rest() {
    let ws = Workspace::new();
    ws.write(
        "flow.sf",
        "bash -c 'echo boom >&2; exit 7' > [[a]]\ncat ((a)) > [[b]]\n",
    );

    let output = ws.shellflow(&["run", "flow.sf"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("boom"), "stderr: {}", stderr);

    let run = &ws.run_dirs()[0];
    assert_eq!(
        std::fs::read_to_string(run.join("job001/rc")).unwrap().trim(),
        "7"
    );
    // the second task never ran; it carries the synthesized code
    assert_eq!(
        std::fs::read_to_string(run.join("job002/rc")).unwrap().trim(),
        "2000"
    );
    assert!(!ws.exists("b"));
}

#[test]
fn scripts_only_generates_without_running() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");

    ws.shellflow_ok(&["run", "--scripts-only", "flow.sf"]);

    let run = &ws.run_dirs()[0];
    assert!(run.join("job001/script.sh").exists());
    assert!(!run.join("job001/rc").exists());
    assert!(!ws.exists("foo"));
}

#[test]
fn skip_sha_leaves_digests_empty_in_job_logs() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");

    ws.shellflow_ok(&["run", "--skip-sha", "flow.sf"]);

    let run = &ws.run_dirs()[0];
    let inputs: serde_json::Value =
        serde_json::from_slice(&std::fs::read(run.join("job001/input.json")).unwrap()).unwrap();
    assert_eq!(inputs.as_array().unwrap()[0]["sha256"], "");
}
