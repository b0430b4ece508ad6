// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::ShellTask;
use yare::parameterized;

fn task(id: usize) -> ShellTask {
    ShellTask {
        line_num: 1,
        id,
        shell_script: format!("echo {}", id),
        dependent_files: Default::default(),
        creating_files: Default::default(),
        dependent_task_ids: vec![],
        should_skip: false,
        reuse_log: None,
        command_config: Default::default(),
    }
}

fn job(is_started: bool, is_done: bool, exit_code: i32) -> JobLog {
    JobLog {
        job_log_root: "wf/job001".into(),
        input_files: vec![],
        output_files: vec![],
        is_started,
        any_input_changed: false,
        is_done,
        any_output_changed: false,
        exit_code,
        script_exit_code: exit_code,
        shell_task: task(1),
        cluster_task_id: None,
    }
}

#[parameterized(
    done = { true, true, 0, JobState::Done },
    failed = { true, true, 2, JobState::Failed },
    unreported = { true, true, EXIT_CODE_UNREPORTED, JobState::Failed },
    running = { true, false, -1, JobState::Running },
    pending = { false, false, -1, JobState::Pending },
)]
fn job_state_classification(started: bool, done: bool, exit_code: i32, expected: JobState) {
    assert_eq!(job(started, done, exit_code).state(), expected);
}

#[test]
fn reusable_requires_success_and_unchanged_files() {
    assert!(job(true, true, 0).is_reusable());
    assert!(!job(true, true, 1).is_reusable());
    assert!(!job(true, false, -1).is_reusable());
    assert!(!job(false, true, 0).is_reusable());

    let mut changed_input = job(true, true, 0);
    changed_input.any_input_changed = true;
    assert!(!changed_input.is_reusable());

    let mut changed_output = job(true, true, 0);
    changed_output.any_output_changed = true;
    assert!(!changed_output.is_reusable());
}

fn workflow(jobs: Vec<JobLog>) -> WorkflowLog {
    WorkflowLog {
        workflow_log_root: "wf/run".into(),
        workflow_script: "flow.sf".into(),
        parameter_file: String::new(),
        start_date: chrono::Utc::now(),
        changed_input: vec![],
        job_logs: jobs,
    }
}

#[test]
fn workflow_failed_wins_over_running() {
    let log = workflow(vec![job(true, true, 1), job(true, false, -1)]);
    assert_eq!(log.state(), WorkflowState::Failed);
    assert!(!log.is_done());
}

#[test]
fn workflow_running_when_any_job_is_not_done() {
    let log = workflow(vec![job(true, true, 0), job(false, false, -1)]);
    assert_eq!(log.state(), WorkflowState::Running);
}

#[test]
fn workflow_done_when_all_jobs_succeed() {
    let log = workflow(vec![job(true, true, 0), job(true, true, 0)]);
    assert_eq!(log.state(), WorkflowState::Done);
    assert!(log.is_done());
    assert!(!log.is_changed());
}

#[test]
fn workflow_changed_when_any_job_saw_a_change() {
    let mut changed = job(true, true, 0);
    changed.any_output_changed = true;
    let log = workflow(vec![job(true, true, 0), changed]);
    assert!(log.is_changed());
}

#[test]
fn json_round_trip() {
    let log = workflow(vec![job(true, true, 0), job(true, false, -1)]);
    let json = serde_json::to_string_pretty(&log).unwrap();
    let back: WorkflowLog = serde_json::from_str(&json).unwrap();
    assert_eq!(back, log);
}
