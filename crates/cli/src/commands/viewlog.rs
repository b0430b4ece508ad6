// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shellflow viewlog`

use clap::Args;
use sf_core::joblog::JobState;
use sf_core::paths::{SCRIPT_STDERR_FILE, WORKFLOW_LOG_DIR};
use sf_core::{WorkflowLog, WorkflowState};
use sf_storage::{collect_logs, Cache};
use std::fmt::Write as _;
use std::path::Path;

/// Number of runs shown without `--all`.
const SHOW_MAX: usize = 10;

#[derive(Args)]
pub struct ViewlogArgs {
    /// Show every run, not only the latest ones
    #[arg(long)]
    pub all: bool,

    /// Show failed jobs only
    #[arg(long)]
    pub failed: bool,

    /// Run numbers to show in detail (from the table's `#` column)
    pub runs: Vec<String>,
}

pub fn run(args: ViewlogArgs) -> anyhow::Result<()> {
    let cache = Cache::new(WORKFLOW_LOG_DIR);
    let logs = collect_logs(&cache, Path::new(WORKFLOW_LOG_DIR))?;

    if args.runs.is_empty() {
        print_table(&logs.0, args.all, args.failed);
    } else {
        print_details(&logs.0, &args.runs, args.failed);
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn print_table(logs: &[WorkflowLog], show_all: bool, failed_only: bool) {
    println!(
        "{:>3}|{:>7}|Success|Failed|Running|Pending|File Changed|{:<19}|Name",
        "#", "State", "Start Date"
    );

    // newest first while selecting, oldest first while printing
    let mut selected = Vec::new();
    for (index, log) in logs.iter().enumerate().rev() {
        if !show_all && selected.len() >= SHOW_MAX {
            break;
        }
        if !failed_only || log.state() == WorkflowState::Failed {
            selected.push(index);
        }
    }
    selected.sort_unstable();

    for index in selected {
        let log = &logs[index];

        let mut success = 0;
        let mut failed = 0;
        let mut running = 0;
        let mut pending = 0;
        for job in &log.job_logs {
            match job.state() {
                JobState::Done => success += 1,
                JobState::Failed => failed += 1,
                JobState::Running => running += 1,
                JobState::Pending => pending += 1,
            }
        }

        let mut name = basename(&log.workflow_script);
        if !log.parameter_file.is_empty() {
            name.push(' ');
            name.push_str(&basename(&log.parameter_file));
        }

        println!(
            "{:>3}|{:>7}|{:>7}|{:>6}|{:>7}|{:>7}|{:>12}|{}|{}",
            index + 1,
            log.state(),
            success,
            failed,
            running,
            pending,
            yes_no(log.is_changed()),
            log.start_date.format("%Y/%m/%d %H:%M:%S"),
            name,
        );
    }
}

fn print_details(logs: &[WorkflowLog], runs: &[String], failed_only: bool) {
    let mut first = true;
    for run in runs {
        let Some(index) = run
            .parse::<usize>()
            .ok()
            .filter(|&number| number >= 1 && number <= logs.len())
        else {
            eprintln!("Bad workflow record number: {}", run);
            continue;
        };

        if !first {
            println!("===========================");
        }
        first = false;
        print!("{}", summary(&logs[index - 1], failed_only));
    }
}

/// Human-readable description of one run, in the log-directory order.
fn summary(log: &WorkflowLog, failed_only: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Workflow Script Path: {}", log.workflow_script);
    let _ = writeln!(out, "   Workflow Log Path: {}", log.workflow_log_root.display());
    let _ = writeln!(
        out,
        "           Job Start: {}",
        log.start_date.format("%Y/%m/%d %H:%M:%S")
    );
    let _ = write!(out, " Changed Input Files:");
    for path in &log.changed_input {
        let _ = write!(out, " {}", path);
    }
    let _ = writeln!(out);

    for job in &log.job_logs {
        if failed_only && job.state() != JobState::Failed {
            continue;
        }

        let _ = writeln!(out, "---- Job: {} ------------", job.shell_task.id);
        let _ = writeln!(out, "             State: {}", job.state());
        if job.exit_code >= 0 {
            let _ = writeln!(out, "         Exit code: {}", job.exit_code);
        }
        let _ = writeln!(out, "          Reusable: {}", yes_no(job.is_reusable()));
        let _ = writeln!(out, "            Script: {}", job.shell_task.shell_script);
        let _ = write!(out, "             Input:");
        for file in &job.shell_task.dependent_files {
            let _ = write!(out, " {}", file);
        }
        let _ = writeln!(out);
        let _ = write!(out, "            Output:");
        for file in &job.shell_task.creating_files {
            let _ = write!(out, " {}", file);
        }
        let _ = writeln!(out);
        let _ = write!(out, " Dependent Job IDs:");
        for id in &job.shell_task.dependent_task_ids {
            let _ = write!(out, " {}", id);
        }
        let _ = writeln!(out);

        if let Some(cluster_id) = &job.cluster_task_id {
            if !cluster_id.trim().is_empty() {
                let _ = writeln!(out, "   Cluster Task ID: {}", cluster_id.trim());
            }
        }
        let _ = writeln!(out, "     Log directory: {}", job.job_log_root.display());

        if job.state() == JobState::Failed {
            if let Ok(stderr) = std::fs::read_to_string(job.job_log_root.join(SCRIPT_STDERR_FILE))
            {
                let _ = writeln!(out, "  - - - - - - Stderr - - - - - -");
                for line in stderr.lines().take(3) {
                    let _ = writeln!(out, "  {}", line);
                }
            }
        }
    }

    out
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
#[path = "viewlog_tests.rs"]
mod tests;
