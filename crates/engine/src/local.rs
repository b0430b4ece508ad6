// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential local execution.

use crate::builder::ShellTaskBuilder;
use crate::error::{EngineError, ExecutionError};
use crate::generate::TaskScripts;
use sf_core::joblog::EXIT_CODE_ABANDONED;
use sf_core::paths::{LOCAL_RUN_PID_FILE, RC_FILE, RUN_STDERR_FILE, RUN_STDOUT_FILE};
use sf_core::ShellTask;
use std::fs;
use std::process::{Command, Stdio};
use tracing::warn;

/// Run every task in id order on the local machine, one at a time.
///
/// After the first failure the remaining tasks are not run; each gets a
/// synthesized `rc = 2000` so a later `viewlog` can tell "abandoned"
/// from "never generated". Skipped tasks are announced and passed over.
/// The first failure is returned after the loop completes.
pub fn execute_local(
    scripts: &TaskScripts,
    builder: &ShellTaskBuilder,
) -> Result<(), EngineError> {
    let mut first_failure: Option<EngineError> = None;

    for task in &builder.tasks {
        let Some(generated) = scripts.script(task.id) else {
            continue;
        };

        if first_failure.is_some() {
            fs::write(
                generated.job_root.join(RC_FILE),
                EXIT_CODE_ABANDONED.to_string(),
            )?;
            continue;
        }

        if task.should_skip {
            println!("skipping: {}", task.shell_script);
            continue;
        }

        if let Err(err) = execute_one_task(scripts, task) {
            warn!("task {} failed: {}", task.id, err);
            first_failure = Some(err);
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Run one task's `run.sh` to completion.
///
/// The wrapper's stdout/stderr are captured into `run.stdout` /
/// `run.stderr`; the child pid is persisted before waiting so a later
/// scan can probe an interrupted run.
pub fn execute_one_task(scripts: &TaskScripts, task: &ShellTask) -> Result<(), EngineError> {
    let generated = scripts
        .script(task.id)
        .ok_or_else(|| EngineError::Io(std::io::Error::other("no generated script for task")))?;

    println!("{}", task.shell_script);

    let stdout = fs::File::create(generated.job_root.join(RUN_STDOUT_FILE))?;
    let stderr = fs::File::create(generated.job_root.join(RUN_STDERR_FILE))?;

    let mut child = Command::new("/bin/bash")
        .arg(&generated.run_script_path)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn()?;

    fs::write(
        generated.job_root.join(LOCAL_RUN_PID_FILE),
        child.id().to_string(),
    )?;

    let status = child.wait()?;
    if status.success() {
        return Ok(());
    }

    // a signal death reports no code; treat it as failed-to-report
    let exit_code = status.code().unwrap_or(sf_core::joblog::EXIT_CODE_UNREPORTED);
    Err(EngineError::Execution(ExecutionError {
        exit_code,
        job_root: generated.job_root.clone(),
        shell_task: task.clone(),
    }))
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
