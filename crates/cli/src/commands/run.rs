// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shellflow run`

use anyhow::Context;
use clap::Args;
use sf_core::paths::{RUN_STDERR_FILE, SCRIPT_STDERR_FILE};
use sf_core::Configuration;
use sf_engine::{
    execute_cluster, execute_local, expand_workflow, generate_task_scripts, EngineError,
    ExecutionError, RunEnvironment,
};
use sf_storage::{collect_logs_for_one_job, Cache};
use std::path::PathBuf;

#[derive(Args)]
pub struct RunArgs {
    /// Submit to SGE/UGE instead of the local executor
    #[arg(long)]
    pub sge: bool,

    /// Print the jobs that would run, without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate job scripts only, without executing
    #[arg(long)]
    pub scripts_only: bool,

    /// Skip SHA-256 calculation in generated file logs
    #[arg(long)]
    pub skip_sha: bool,

    /// Rerun every task even when a prior run could be reused
    #[arg(long)]
    pub rerun: bool,

    /// Parameter file (JSON map of name → string or number)
    #[arg(long)]
    pub param: Option<PathBuf>,

    /// Workflow file
    pub workflow: PathBuf,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut env = RunEnvironment::new()?;
    env.skip_sha = args.skip_sha;
    env.dry_run = args.dry_run;
    env.scripts_only = args.scripts_only;
    env.rerun_all = args.rerun;

    let parameters = super::load_parameters(args.param.as_deref())?;
    env.bind_parameters(parameters)?;

    let config = Configuration::load()?;
    let content = std::fs::read_to_string(&args.workflow)
        .with_context(|| format!("cannot read workflow {}", args.workflow.display()))?;

    let cache = Cache::new(&env.workflow_root);
    let mut builder = expand_workflow(&cache, &env, config, &content)?;

    if env.dry_run {
        for task in &builder.tasks {
            if !task.should_skip || env.rerun_all {
                println!("{}", task.shell_script);
            }
        }
        return Ok(());
    }

    if env.rerun_all {
        builder.clear_skips();
    }

    let scripts = generate_task_scripts(
        &cache,
        &env,
        &builder,
        &args.workflow,
        args.param.as_deref(),
    )?;

    if env.scripts_only {
        return Ok(());
    }

    let result = if args.sge {
        execute_cluster(&scripts, &builder)
    } else {
        execute_local(&scripts, &builder)
    };

    match result {
        Ok(()) => Ok(()),
        Err(EngineError::Execution(execution)) => {
            eprintln!("Error: {}", execution);
            report_failure(&cache, &execution);
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

/// Print the failing job's stderr: the script's own stderr normally, the
/// wrapper's when the script itself reported success (the wrapper must
/// have failed around it).
fn report_failure(cache: &Cache, execution: &ExecutionError) {
    let stderr_file =
        match collect_logs_for_one_job(cache, &execution.job_root, &execution.shell_task) {
            Ok(job_log) if job_log.script_exit_code == 0 => RUN_STDERR_FILE,
            Ok(_) => SCRIPT_STDERR_FILE,
            Err(_) => SCRIPT_STDERR_FILE,
        };

    if let Ok(content) = std::fs::read_to_string(execution.job_root.join(stderr_file)) {
        eprint!("{}", content);
    }
}
