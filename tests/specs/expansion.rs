// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow expansion observed through `--dry-run` and `dot`.

use crate::prelude::Workspace;

#[test]
fn dry_run_prints_expanded_tasks_without_executing() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write(
        "flow.sf",
        "cat ((hoge)) > [[foo]]\ncat ((foo)) > [[bar]]\ncat ((foo)) ((hoge)) > [[bar2]]\n",
    );

    let stdout = ws.shellflow_ok(&["run", "--dry-run", "flow.sf"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "cat hoge > foo",
            "cat foo > bar",
            "cat foo hoge > bar2",
        ]
    );

    assert!(!ws.exists("foo"));
    assert!(ws.run_dirs().is_empty());
}

#[test]
fn for_loop_over_a_glob_expands_per_file() {
    let ws = Workspace::new();
    ws.write("examples/hello.c", "int main() {}\n");
    ws.write("examples/helloprint.c", "int main() {}\n");
    ws.write("examples/notes.txt", "not C\n");
    ws.write("flow.sf", "for y in examples/*.c; do\ntest {{y}}\ndone\n");

    let stdout = ws.shellflow_ok(&["run", "--dry-run", "flow.sf"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["test examples/hello.c", "test examples/helloprint.c"]
    );
}

#[test]
fn zip_iteration_pairs_two_arrays() {
    let ws = Workspace::new();
    ws.write(
        "flow.sf",
        "#% a = [1,2,3]\n#% b = [4,5,6]\nfor y in {{zip(a,b)}}; do\ntest {{y[0]}} / {{y[1]}}\ndone\n",
    );

    let stdout = ws.shellflow_ok(&["run", "--dry-run", "flow.sf"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["test 1 / 4", "test 2 / 5", "test 3 / 6"]);
}

#[test]
fn loop_variables_persist_after_done() {
    let ws = Workspace::new();
    ws.write(
        "flow.sf",
        "for y in a b c; do\necho {{y}}\ndone\necho {{y}}\n",
    );

    let stdout = ws.shellflow_ok(&["run", "--dry-run", "flow.sf"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["echo a", "echo b", "echo c", "echo c"]);
}

#[test]
fn parameters_reach_the_expansion() {
    let ws = Workspace::new();
    ws.write("params.json", r#"{"sample": "NA12878", "threads": 4}"#);
    ws.write("flow.sf", "align --threads {{threads}} [[{{sample + \".bam\"}}]]\n");

    let stdout = ws.shellflow_ok(&["run", "--dry-run", "--param", "params.json", "flow.sf"]);
    assert_eq!(stdout.trim(), "align --threads 4 NA12878.bam");
}

#[test]
fn dot_export_describes_the_dag() {
    let ws = Workspace::new();
    ws.write("hoge", "foo");
    ws.write("flow.sf", "cat ((hoge)) > [[foo]]\ncat ((foo)) > [[bar]]\n");

    let stdout = ws.shellflow_ok(&["dot", "flow.sf"]);
    assert!(stdout.contains("digraph shelltask {"));
    assert!(stdout.contains("task1 [label=\"cat hoge > foo\"];"));
    assert!(stdout.contains("task1 -> task2 [label=\"foo\"];"));
    assert!(stdout.contains("input0 [label=\"hoge\", color=red];"));
    assert!(stdout.contains("[label=\"bar\", color=blue];"));
}

#[test]
fn bad_expression_aborts_with_the_line_number() {
    let ws = Workspace::new();
    ws.write("flow.sf", "echo fine\necho {{(broken}}\n");

    let output = ws.shellflow(&["run", "--dry-run", "flow.sf"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "stderr: {}", stderr);
}
