// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reuse of prior jobs across runs.

use crate::prelude::Workspace;
use std::fs::OpenOptions;
use std::io::Write;

const COPY_CHAIN: &str =
    "cat ((hoge)) > [[foo]]\ncat ((foo)) > [[bar]]\ncat ((foo)) ((hoge)) > [[bar2]]\n";

#[test]
fn unchanged_rerun_reuses_every_job() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", COPY_CHAIN);

    ws.shellflow_ok(&["run", "flow.sf"]);
    let stdout = ws.shellflow_ok(&["run", "flow.sf"]);

    let skipped = stdout.lines().filter(|l| l.starts_with("skipping: ")).count();
    assert_eq!(skipped, 3, "stdout: {}", stdout);

    let runs = ws.run_dirs();
    assert_eq!(runs.len(), 2);

    // the reused job directory carries byte copies plus the back link
    let old_job = runs[0].join("job001");
    let new_job = runs[1].join("job001");
    for name in [
        "script.sh",
        "run.sh",
        "script.stdout",
        "script.stderr",
        "rc",
        "input.json",
        "output.json",
    ] {
        let old = std::fs::read(old_job.join(name)).unwrap();
        let new = std::fs::read(new_job.join(name)).unwrap();
        assert_eq!(old, new, "copied file {}", name);
    }

    let link = new_job.join("original");
    let target = std::fs::read_link(&link).unwrap();
    assert!(target.is_relative());
    assert_eq!(
        std::fs::canonicalize(new_job.join(&target)).unwrap(),
        std::fs::canonicalize(&old_job).unwrap()
    );
}

#[test]
fn touched_input_cascades_into_a_full_rerun() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", COPY_CHAIN);

    ws.shellflow_ok(&["run", "flow.sf"]);

    // append to the top-level input; task 1 is no longer reusable and
    // its consumers must follow
    let mut file = OpenOptions::new()
        .append(true)
        .open(ws.path().join("hoge"))
        .unwrap();
    file.write_all(b"\n").unwrap();
    drop(file);

    let stdout = ws.shellflow_ok(&["run", "flow.sf"]);
    assert!(
        !stdout.contains("skipping:"),
        "no task may be skipped after the input changed: {}",
        stdout
    );

    let runs = ws.run_dirs();
    assert_eq!(runs.len(), 2);
    for job in ["job001", "job002", "job003"] {
        assert!(
            !runs[1].join(job).join("original").exists(),
            "{} must not be a reuse copy",
            job
        );
        assert_eq!(
            std::fs::read_to_string(runs[1].join(job).join("rc")).unwrap().trim(),
            "0"
        );
    }

    assert_eq!(ws.read("foo"), "foo\n");
    assert_eq!(ws.read("bar2"), "foo\nfoo\n");
}

#[test]
fn changed_command_defeats_reuse() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");
    ws.shellflow_ok(&["run", "flow.sf"]);

    // same input, different command text
    ws.write("flow.sf", "cat ((hoge)) ((hoge)) > [[foo]]\n");
    let stdout = ws.shellflow_ok(&["run", "flow.sf"]);
    assert!(!stdout.contains("skipping:"));
    assert_eq!(ws.read("foo"), "foofoo");
}

#[test]
fn rerun_flag_ignores_reusable_jobs() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");
    ws.shellflow_ok(&["run", "flow.sf"]);

    let stdout = ws.shellflow_ok(&["run", "--rerun", "flow.sf"]);
    assert!(!stdout.contains("skipping:"));

    let runs = ws.run_dirs();
    assert!(!runs[1].join("job001/original").exists());
    assert_eq!(
        std::fs::read_to_string(runs[1].join("job001/rc")).unwrap().trim(),
        "0"
    );
}

#[test]
fn scan_results_are_cached_per_run_directory() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\n");

    ws.shellflow_ok(&["run", "flow.sf"]);
    // the second run scans the first and leaves a gzip cache behind
    ws.shellflow_ok(&["run", "flow.sf"]);

    let runs = ws.run_dirs();
    let cache_path = runs[0].join("workflowLogCache.json.gz");
    assert!(cache_path.exists());

    let file = std::fs::File::open(cache_path).unwrap();
    let decoder = flate2::read::GzDecoder::new(file);
    let cached: serde_json::Value = serde_json::from_reader(decoder).unwrap();

    assert_eq!(cached["job_logs"].as_array().unwrap().len(), 1);
    let job = &cached["job_logs"][0];
    assert_eq!(job["is_done"], true);
    assert_eq!(job["exit_code"], 0);
    assert_eq!(job["shell_task"]["shell_script"], "cat hoge > foo");
}

#[test]
fn failed_jobs_are_not_reused() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "bash -c 'cat hoge > foo; exit 5' ((hoge)) > [[foo]]\n");

    let output = ws.shellflow(&["run", "flow.sf"]);
    assert_eq!(output.status.code(), Some(1));

    // the second attempt runs again instead of adopting the failure
    let output = ws.shellflow(&["run", "flow.sf"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("skipping:"));
}
