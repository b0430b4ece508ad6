// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Follow-up probes for jobs that stopped reporting.
//!
//! A job normally ends by writing its exit code into `rc`. When `rc` is
//! missing, these probes inspect the persisted process handles: a local
//! pid file or a cluster task id. A handle pointing at something that no
//! longer exists gets a synthesized `rc = 1000` so the scanner can
//! classify the job as failed instead of running forever.

use sf_core::joblog::EXIT_CODE_UNREPORTED;
use sf_core::paths::{LOCAL_RUN_PID_FILE, RC_FILE, SGE_TASK_ID_FILE};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// The command used to ask the cluster scheduler about a task.
pub const CLUSTER_STATUS_COMMAND: [&str; 2] = ["qstat", "-j"];

/// Probe a job via its local pid file.
///
/// Returns `true` when the probe applied (a pid file existed): either the
/// process is still alive and `rc` stays absent, or it is gone and a
/// synthesized `rc` was written. Returns `false` when `rc` already exists
/// or there is no pid file.
pub fn follow_up_local(job_root: &Path) -> io::Result<bool> {
    if job_root.join(RC_FILE).exists() {
        return Ok(false);
    }

    let pid_content = match std::fs::read_to_string(job_root.join(LOCAL_RUN_PID_FILE)) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    let pid: u32 = parse_leading_int(&pid_content).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("cannot read pid from {}", job_root.display()),
        )
    })?;

    if !process_alive(pid) {
        debug!(pid, job_root = %job_root.display(), "process is gone, synthesizing rc");
        write_unreported_rc(job_root)?;
    }
    Ok(true)
}

/// Probe a job via its cluster task id file.
///
/// Same contract as [`follow_up_local`], consulting the scheduler's
/// status-query command instead of the process table.
pub fn follow_up_cluster(job_root: &Path) -> io::Result<bool> {
    if job_root.join(RC_FILE).exists() {
        return Ok(false);
    }

    let id_content = match std::fs::read_to_string(job_root.join(SGE_TASK_ID_FILE)) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    let task_id: u64 = parse_leading_int(&id_content).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("cannot read cluster task id from {}", job_root.display()),
        )
    })?;

    let alive = Command::new(CLUSTER_STATUS_COMMAND[0])
        .arg(CLUSTER_STATUS_COMMAND[1])
        .arg(task_id.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);

    if !alive {
        debug!(task_id, job_root = %job_root.display(), "cluster task is gone, synthesizing rc");
        write_unreported_rc(job_root)?;
    }
    Ok(true)
}

fn write_unreported_rc(job_root: &Path) -> io::Result<()> {
    std::fs::write(
        job_root.join(RC_FILE),
        EXIT_CODE_UNREPORTED.to_string(),
    )
}

/// `kill -0` without sending a signal; a failing status means the pid is
/// gone (or owned by another user, which for our own job pids amounts to
/// the same thing).
fn process_alive(pid: u32) -> bool {
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn parse_leading_int<T: std::str::FromStr>(content: &str) -> Option<T> {
    let digits: &str = content
        .trim_start()
        .split(|ch: char| !ch.is_ascii_digit())
        .next()?;
    digits.parse().ok()
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
