// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job and per-run logs discovered from prior workflow runs.

use crate::filelog::FileLog;
use crate::task::ShellTask;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Exit code synthesized for a job that failed to report one (dead
/// process, vanished cluster job, missing output log).
pub const EXIT_CODE_UNREPORTED: i32 = 1000;

/// Exit code synthesized for a task never attempted because an earlier
/// task failed.
pub const EXIT_CODE_ABANDONED: i32 = 2000;

/// State of one job within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Done,
    Failed,
    Running,
    Pending,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Done => write!(f, "Done"),
            JobState::Failed => write!(f, "Failed"),
            JobState::Running => write!(f, "Running"),
            JobState::Pending => write!(f, "Pending"),
        }
    }
}

/// State of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Done,
    Running,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Done => write!(f, "Done"),
            WorkflowState::Running => write!(f, "Running"),
            WorkflowState::Failed => write!(f, "Failed"),
        }
    }
}

/// Everything the scanner learns about one prior job.
///
/// Materialized fresh on every scan (or refreshed from the gzip cache);
/// `exit_code` is `-1` while the job has not reported one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLog {
    pub job_log_root: PathBuf,
    pub input_files: Vec<FileLog>,
    pub output_files: Vec<FileLog>,
    pub is_started: bool,
    pub any_input_changed: bool,
    pub is_done: bool,
    pub any_output_changed: bool,
    pub exit_code: i32,
    pub script_exit_code: i32,
    pub shell_task: ShellTask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_task_id: Option<String>,
}

impl JobLog {
    pub fn state(&self) -> JobState {
        if self.is_done && self.exit_code == 0 {
            JobState::Done
        } else if self.is_done {
            JobState::Failed
        } else if self.is_started {
            JobState::Running
        } else {
            JobState::Pending
        }
    }

    /// A job can seed a skip only when it ran to success and neither its
    /// recorded inputs nor outputs have changed on disk since.
    pub fn is_reusable(&self) -> bool {
        self.is_done
            && self.is_started
            && !self.any_input_changed
            && !self.any_output_changed
            && self.exit_code == 0
    }
}

/// One past workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowLog {
    pub workflow_log_root: PathBuf,
    pub workflow_script: String,
    pub parameter_file: String,
    pub start_date: DateTime<Utc>,
    pub changed_input: Vec<String>,
    pub job_logs: Vec<JobLog>,
}

impl WorkflowLog {
    pub fn is_done(&self) -> bool {
        self.job_logs.iter().all(|job| job.is_done)
    }

    pub fn state(&self) -> WorkflowState {
        if self.job_logs.iter().any(|job| job.state() == JobState::Failed) {
            WorkflowState::Failed
        } else if self.job_logs.iter().any(|job| !job.is_done) {
            WorkflowState::Running
        } else {
            WorkflowState::Done
        }
    }

    /// Whether any job saw an input or output change on disk.
    pub fn is_changed(&self) -> bool {
        self.job_logs
            .iter()
            .any(|job| job.any_input_changed || job.any_output_changed)
    }
}

#[cfg(test)]
#[path = "joblog_tests.rs"]
mod tests;
