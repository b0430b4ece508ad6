// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task builder: expanded shell lines → dependency-annotated tasks.

use crate::env::RunEnvironment;
use crate::error::EngineError;
use sf_core::{Configuration, ShellTask};
use sf_storage::{collect_logs, Cache, WorkflowLogs};
use sf_workflow::TaskSink;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors from building one task out of a shell line.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("closing bracket is not found: {closer}")]
    MissingClosingBracket { closer: &'static str },

    #[error("invalid glob pattern {pattern:?}: {message}")]
    Glob { pattern: String, message: String },
}

/// Accumulates [`ShellTask`]s in expansion order.
///
/// Ids are assigned densely from 1. Names in `((…))` spans with no
/// producing task gather in `missing_creator_files` — the workflow's
/// external inputs.
pub struct ShellTaskBuilder {
    pub tasks: Vec<ShellTask>,
    pub missing_creator_files: BTreeSet<String>,
    pub workflow_content: String,
    current_id: usize,
    workflow_logs: WorkflowLogs,
    config: Configuration,
    work_dir: PathBuf,
}

impl ShellTaskBuilder {
    pub fn new(config: Configuration, work_dir: PathBuf, workflow_logs: WorkflowLogs) -> Self {
        ShellTaskBuilder {
            tasks: Vec::new(),
            missing_creator_files: BTreeSet::new(),
            workflow_content: String::new(),
            current_id: 0,
            workflow_logs,
            config,
            work_dir,
        }
    }

    /// Build one task from a fully-substituted shell line.
    ///
    /// Extracts `((input))`/`[[output]]` annotations (stripping brackets,
    /// keeping content, globbing spans that contain `*`/`?`), finds the
    /// most recent producer of each input among earlier tasks, and
    /// decides skippability: a task skips only when every producer skips
    /// and a reusable prior job with the same script and input set
    /// exists.
    pub fn create_shell_task(
        &mut self,
        line_num: usize,
        line: &str,
    ) -> Result<&ShellTask, TaskError> {
        let (shell_script, dependent_files, creating_files) = extract_annotations(line)?;

        // find producers, newest first
        let mut producer_ids = BTreeSet::new();
        for name in &dependent_files {
            match self
                .tasks
                .iter()
                .rev()
                .find(|task| task.creating_files.contains(name))
            {
                Some(producer) => {
                    producer_ids.insert(producer.id);
                }
                None => {
                    self.missing_creator_files.insert(name.clone());
                }
            }
        }

        let skippable = producer_ids
            .iter()
            .all(|&id| self.tasks[id - 1].should_skip);
        let dependent_task_ids: Vec<usize> = producer_ids.into_iter().collect();

        let (should_skip, reuse_log) = if skippable {
            match self.workflow_logs.search_reusable_job(
                &shell_script,
                &self.work_dir,
                &dependent_files,
                &creating_files,
            ) {
                Some(job) => (true, Some(Box::new(job.clone()))),
                None => (false, None),
            }
        } else {
            (false, None)
        };

        let command_config = self.config.match_command(&shell_script);

        self.current_id += 1;
        debug!(
            id = self.current_id,
            line = line_num,
            skip = should_skip,
            script = %shell_script,
            "built task"
        );

        self.tasks.push(ShellTask {
            line_num,
            id: self.current_id,
            shell_script,
            dependent_files,
            creating_files,
            dependent_task_ids,
            should_skip,
            reuse_log,
            command_config,
        });
        Ok(&self.tasks[self.current_id - 1])
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Clear every skip decision (the `--rerun` flag).
    pub fn clear_skips(&mut self) {
        for task in &mut self.tasks {
            task.should_skip = false;
            task.reuse_log = None;
        }
    }
}

impl TaskSink for ShellTaskBuilder {
    type Error = TaskError;

    fn push_line(&mut self, line_num: usize, line: String) -> Result<(), TaskError> {
        self.create_shell_task(line_num, &line)?;
        Ok(())
    }
}

/// Scan a line for `((…))` / `[[…]]` spans.
///
/// Whichever opener appears first owns the next span; its closer is
/// mandatory. Returns the formatted line (brackets stripped, content
/// kept) and the input/output name sets.
fn extract_annotations(
    line: &str,
) -> Result<(String, BTreeSet<String>, BTreeSet<String>), TaskError> {
    let mut formatted = String::with_capacity(line.len());
    let mut dependent_files = BTreeSet::new();
    let mut creating_files = BTreeSet::new();
    let mut rest = line;

    loop {
        let input_start = rest.find("((");
        let output_start = rest.find("[[");

        let (start, closer, is_input) = match (input_start, output_start) {
            (None, None) => {
                formatted.push_str(rest);
                break;
            }
            (Some(input), None) => (input, "))", true),
            (None, Some(output)) => (output, "]]", false),
            (Some(input), Some(output)) if input < output => (input, "))", true),
            (_, Some(output)) => (output, "]]", false),
        };

        formatted.push_str(&rest[..start]);
        rest = &rest[start..];

        let end = rest
            .find(closer)
            .ok_or(TaskError::MissingClosingBracket { closer })?;
        let content = &rest[2..end];
        formatted.push_str(content);
        rest = &rest[end + 2..];

        let names = expand_span(content)?;
        if is_input {
            dependent_files.extend(names);
        } else {
            creating_files.extend(names);
        }
    }

    Ok((formatted, dependent_files, creating_files))
}

/// Names inside one annotation span: a glob when it contains `*`/`?`
/// (zero matches contribute zero names), otherwise the content verbatim.
fn expand_span(content: &str) -> Result<Vec<String>, TaskError> {
    if !content.contains('*') && !content.contains('?') {
        return Ok(vec![content.to_string()]);
    }

    let paths = glob::glob(content).map_err(|err| TaskError::Glob {
        pattern: content.to_string(),
        message: err.to_string(),
    })?;
    Ok(paths
        .flatten()
        .map(|path| path.to_string_lossy().to_string())
        .collect())
}

/// Parse and expand a workflow: collect prior-run logs, lower the file
/// to blocks, and drive the expander into a fresh task builder.
pub fn expand_workflow(
    cache: &Cache,
    env: &RunEnvironment,
    config: Configuration,
    content: &str,
) -> Result<ShellTaskBuilder, EngineError> {
    let workflow_logs = collect_logs(cache, &env.workflow_root)?;
    let mut builder = ShellTaskBuilder::new(config, env.work_dir.clone(), workflow_logs);

    let tree = sf_workflow::block::parse_workflow(content)?;
    sf_workflow::expand(&tree, &env.flow_env, &mut builder)?;
    builder.workflow_content = tree.content;

    Ok(builder)
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
