// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job script generation.
//!
//! One run directory per submission
//! (`<stamp>-<workflow-basename>-<uuid>/`), one `jobNNN/` directory per
//! task. Each non-skipped job gets the raw `script.sh` plus a `run.sh`
//! wrapper that records file logs before and after the script and leaves
//! the exit code in `rc`. A skipped task gets byte copies of the reused
//! job's artifacts and an `original` symlink back to them.

use crate::builder::ShellTaskBuilder;
use crate::env::RunEnvironment;
use crate::error::EngineError;
use sf_core::paths::{
    job_dir_name, INPUT_LOG_FILE, OUTPUT_LOG_FILE, RC_FILE, REUSED_JOB_FILES, RUNTIME_FILE,
    RUN_SCRIPT_FILE, SCRIPT_FILE, SCRIPT_STDERR_FILE, SCRIPT_STDOUT_FILE,
};
use sf_core::WorkflowMetaData;
use sf_storage::{create_file_logs, Cache};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Paths of one generated job.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub job_root: PathBuf,
    pub script_path: PathBuf,
    pub run_script_path: PathBuf,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    pub skip: bool,
}

/// All generated jobs of one run.
#[derive(Debug)]
pub struct TaskScripts {
    /// The run directory under the workflow-log root.
    pub run_root: PathBuf,
    /// Display name of the submission (workflow file, plus parameter
    /// file when given).
    pub job_name: String,
    pub scripts: BTreeMap<usize, GeneratedScript>,
}

impl TaskScripts {
    pub fn script(&self, task_id: usize) -> Option<&GeneratedScript> {
        self.scripts.get(&task_id)
    }
}

/// Materialize the run directory for every task of the builder.
pub fn generate_task_scripts(
    cache: &Cache,
    env: &RunEnvironment,
    builder: &ShellTaskBuilder,
    script_path: &Path,
    param_path: Option<&Path>,
) -> Result<TaskScripts, EngineError> {
    let basename = file_name(script_path);
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let run_root = env
        .workflow_root
        .join(format!("{}-{}-{}", stamp, basename, uuid::Uuid::new_v4()));
    fs::create_dir_all(&run_root)?;

    let mut job_name = basename.clone();
    if let Some(param) = param_path {
        job_name.push(' ');
        job_name.push_str(&file_name(param));
    }

    // top-level inputs: every file no task creates
    let top_inputs: Vec<String> = builder.missing_creator_files.iter().cloned().collect();
    let input_logs = create_file_logs(cache, &top_inputs, false)?;
    write_pretty_json(&run_root.join(INPUT_LOG_FILE), &input_logs)?;

    let path_env = std::env::var("PATH").unwrap_or_default();
    let ld_library_path_env = std::env::var("LD_LIBRARY_PATH").unwrap_or_default();

    let mut env_map = BTreeMap::new();
    env_map.insert("PATH".to_string(), path_env.clone());
    env_map.insert("LD_LIBRARY_PATH".to_string(), ld_library_path_env.clone());

    let metadata = WorkflowMetaData {
        env: env_map,
        engine: env.engine_path.to_string_lossy().to_string(),
        args: std::env::args().collect(),
        work_dir: env.work_dir.clone(),
        date: chrono::Utc::now(),
        user: std::env::var("USER").unwrap_or_default(),
        workflow: builder.workflow_content.clone(),
        workflow_path: std::path::absolute(script_path)?,
        tasks: builder.tasks.clone(),
        parameters: env.parameters.clone(),
        parameter_file: match param_path {
            Some(param) => std::path::absolute(param)?.to_string_lossy().to_string(),
            None => String::new(),
        },
    };
    write_pretty_json(&run_root.join(RUNTIME_FILE), &metadata)?;

    let mut scripts = BTreeMap::new();
    for task in &builder.tasks {
        let job_root = run_root.join(job_dir_name(task.id));
        fs::create_dir_all(&job_root)?;

        let generated = GeneratedScript {
            script_path: job_root.join(SCRIPT_FILE),
            run_script_path: job_root.join(RUN_SCRIPT_FILE),
            stdout_path: job_root.join(SCRIPT_STDOUT_FILE),
            stderr_path: job_root.join(SCRIPT_STDERR_FILE),
            job_root: job_root.clone(),
            skip: task.should_skip,
        };

        if let (true, Some(reuse)) = (task.should_skip, &task.reuse_log) {
            copy_reused_job(&reuse.job_log_root, &job_root)?;
        } else {
            write_executable(&generated.script_path, &task.shell_script)?;
            let run_script = render_run_script(
                env,
                builder,
                task,
                &generated,
                &path_env,
                &ld_library_path_env,
            )?;
            write_executable(&generated.run_script_path, &run_script)?;
        }

        scripts.insert(task.id, generated);
    }

    if let Ok(relative) = std::env::current_dir().map(|cwd| relative_path(&cwd, &run_root)) {
        println!("Workflow Log: {}", relative.display());
    }
    debug!(run_root = %run_root.display(), "generated task scripts");

    Ok(TaskScripts {
        run_root,
        job_name,
        scripts,
    })
}

/// The `run.sh` wrapper for one task.
fn render_run_script(
    env: &RunEnvironment,
    builder: &ShellTaskBuilder,
    task: &sf_core::ShellTask,
    generated: &GeneratedScript,
    path_env: &str,
    ld_library_path_env: &str,
) -> Result<String, EngineError> {
    let engine = shell_quote(&env.engine_path.to_string_lossy());
    let skip_sha = if env.skip_sha { " --skip-sha" } else { "" };

    let input_log = std::path::absolute(generated.job_root.join(INPUT_LOG_FILE))?;
    let output_log = std::path::absolute(generated.job_root.join(OUTPUT_LOG_FILE))?;
    let rc = std::path::absolute(generated.job_root.join(RC_FILE))?;
    let script = std::path::absolute(&generated.script_path)?;
    let stdout = std::path::absolute(&generated.stdout_path)?;
    let stderr = std::path::absolute(&generated.stderr_path)?;

    let dependent_args = quoted_names(&task.dependent_files);
    let creating_args = quoted_names(&task.creating_files);

    let mut out = String::new();
    let _ = writeln!(out, "#!/bin/bash");
    let _ = writeln!(out, "cd {}", shell_quote(&env.work_dir.to_string_lossy()));

    if !task.command_config.dont_inherit_path {
        let _ = writeln!(out, "export PATH={}", shell_quote(path_env));
        let _ = writeln!(out, "export LD_LIBRARY_PATH={}", shell_quote(ld_library_path_env));
    }
    for (name, value) in &builder.config().environment {
        let _ = writeln!(out, "export {}={}", name, shell_quote(value));
    }

    let _ = writeln!(
        out,
        "{} filelog{} --output {}{} || exit 1",
        engine,
        skip_sha,
        shell_quote(&input_log.to_string_lossy()),
        dependent_args,
    );
    let _ = writeln!(
        out,
        "/bin/bash -o pipefail -e {} > {} 2> {}",
        shell_quote(&script.to_string_lossy()),
        shell_quote(&stdout.to_string_lossy()),
        shell_quote(&stderr.to_string_lossy()),
    );
    let _ = writeln!(out, "EXIT_CODE=$?");
    let _ = writeln!(
        out,
        "{} filelog{} --output {}{} || exit 1",
        engine,
        skip_sha,
        shell_quote(&output_log.to_string_lossy()),
        creating_args,
    );
    let _ = writeln!(out, "echo $EXIT_CODE > {}", shell_quote(&rc.to_string_lossy()));
    let _ = writeln!(out, "exit $EXIT_CODE");
    Ok(out)
}

/// Copy the seven artifact files of a reused job and link back to it.
fn copy_reused_job(reuse_root: &Path, job_root: &Path) -> Result<(), EngineError> {
    for name in REUSED_JOB_FILES {
        fs::copy(reuse_root.join(name), job_root.join(name))?;
    }

    let link_target = relative_path(
        &std::path::absolute(job_root)?,
        &std::path::absolute(reuse_root)?,
    );
    std::os::unix::fs::symlink(link_target, job_root.join(sf_core::paths::ORIGINAL_LINK))?;
    Ok(())
}

fn write_executable(path: &Path, content: &str) -> Result<(), EngineError> {
    fs::write(path, content)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), EngineError> {
    let content = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    fs::write(path, content)?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// ` "a" "b"` — leading space included so an empty set contributes
/// nothing.
fn quoted_names(names: &std::collections::BTreeSet<String>) -> String {
    let mut out = String::new();
    for name in names {
        out.push(' ');
        out.push_str(&shell_quote(name));
    }
    out
}

/// Wrap in double quotes, escaping the characters that stay special
/// inside them.
fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '$' => quoted.push_str("\\$"),
            '`' => quoted.push_str("\\`"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

/// Relative path from one absolute directory to another absolute path.
fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from_dir.components().collect();
    let to_components: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to_components[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

#[cfg(test)]
#[path = "generate_tests.rs"]
mod tests;
