// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster submission with hold dependencies.

use crate::builder::ShellTaskBuilder;
use crate::error::EngineError;
use crate::generate::{GeneratedScript, TaskScripts};
use crate::local::execute_one_task;
use regex::Regex;
use sf_core::paths::{RUN_STDERR_FILE, RUN_STDOUT_FILE, SGE_SUBMIT_ARGS_FILE, SGE_TASK_ID_FILE};
use sf_core::ShellTask;
use std::collections::HashMap;
use std::fs;
use std::process::Command;
use std::sync::LazyLock;
use tracing::warn;

/// The cluster submit command.
pub const SUBMIT_COMMAND: &str = "qsub";

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static JOB_NAME_SANITIZER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-.]").expect("constant regex pattern is valid"));

/// Submit every task in id order.
///
/// Skipped tasks are passed over; tasks whose command config says
/// `RunImmediate` run inline through the local single-task path. Every
/// other task is handed to the scheduler with a hold list naming the
/// cluster ids of its dependencies, so execution order is the
/// scheduler's business. Any submit failure aborts the submission.
pub fn execute_cluster(
    scripts: &TaskScripts,
    builder: &ShellTaskBuilder,
) -> Result<(), EngineError> {
    let job_name_base = JOB_NAME_SANITIZER
        .replace_all(&scripts.job_name, "_")
        .to_string();
    let mut cluster_ids: HashMap<usize, String> = HashMap::new();

    for task in &builder.tasks {
        if task.should_skip {
            println!("skipping: {}", task.shell_script);
            continue;
        }

        if task.command_config.run_immediate {
            execute_one_task(scripts, task)?;
            continue;
        }

        let Some(generated) = scripts.script(task.id) else {
            continue;
        };

        let args = build_submit_args(task, generated, &job_name_base, &cluster_ids);

        let mut audit = String::new();
        for arg in &args {
            audit.push_str(arg);
            audit.push('\n');
        }
        fs::write(generated.job_root.join(SGE_SUBMIT_ARGS_FILE), audit)?;

        let output = Command::new(SUBMIT_COMMAND)
            .args(&args)
            .output()
            .map_err(|err| EngineError::Submit(format!("cannot run {}: {}", SUBMIT_COMMAND, err)))?;
        if !output.status.success() {
            return Err(EngineError::Submit(format!(
                "{} exited with {}: {}",
                SUBMIT_COMMAND,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            )));
        }

        let task_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        fs::write(
            generated.job_root.join(SGE_TASK_ID_FILE),
            format!("{}\n", task_id),
        )?;
        println!("Submit ID:{}  : {}", task_id, task.shell_script);
        cluster_ids.insert(task.id, task_id);
    }

    Ok(())
}

/// The scheduler argv for one task (submit command itself excluded).
pub fn build_submit_args(
    task: &ShellTask,
    generated: &GeneratedScript,
    job_name_base: &str,
    cluster_ids: &HashMap<usize, String>,
) -> Vec<String> {
    let mut args = vec![
        "-wd".to_string(),
        generated.job_root.to_string_lossy().to_string(),
        "-terse".to_string(),
        "-o".to_string(),
        generated.job_root.join(RUN_STDOUT_FILE).to_string_lossy().to_string(),
        "-e".to_string(),
        generated.job_root.join(RUN_STDERR_FILE).to_string_lossy().to_string(),
    ];

    let mut holds = Vec::new();
    for dependency in &task.dependent_task_ids {
        if let Some(id) = cluster_ids.get(dependency) {
            let id = id.trim();
            if id.is_empty() {
                // submission yielded no id; the scheduler cannot hold on it
                warn!(
                    task = task.id,
                    dependency, "dependency has an empty cluster id, hold list is incomplete"
                );
            } else {
                holds.push(id.to_string());
            }
        }
    }
    if !holds.is_empty() {
        args.push("-hold_jid".to_string());
        args.push(holds.join(","));
    }

    args.push("-N".to_string());
    args.push(format!("sf-{}__ID-{}", job_name_base, task.id));

    args.extend(task.command_config.sge_option.iter().cloned());
    args.push(generated.run_script_path.to_string_lossy().to_string());
    args
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
