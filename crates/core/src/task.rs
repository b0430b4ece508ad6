// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete shell tasks.

use crate::config::CommandConfig;
use crate::joblog::JobLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One fully-substituted shell command with its declared file inputs and
/// outputs.
///
/// Tasks are built in expansion order; ids are dense `1..=N`. Every entry
/// in `dependent_task_ids` is strictly smaller than `id` and names a task
/// that creates at least one of this task's `dependent_files`. Once
/// `should_skip` is decided the task is never mutated (except for the
/// `--rerun` flag clearing the skip bit wholesale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellTask {
    pub line_num: usize,
    pub id: usize,
    /// Final shell text with `(())`/`[[]]` brackets stripped but their
    /// content retained.
    pub shell_script: String,
    pub dependent_files: BTreeSet<String>,
    pub creating_files: BTreeSet<String>,
    /// Producer task ids, deduplicated, ascending.
    pub dependent_task_ids: Vec<usize>,
    pub should_skip: bool,
    /// The prior job this task reuses, when `should_skip` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_log: Option<Box<JobLog>>,
    #[serde(default)]
    pub command_config: CommandConfig,
}

impl fmt::Display for ShellTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShellTask{{id: {}, line: {}, script: {:?}, inputs: {:?}, outputs: {:?}, deps: {:?}, skip: {}}}",
            self.id,
            self.line_num,
            self.shell_script,
            self.dependent_files,
            self.creating_files,
            self.dependent_task_ids,
            self.should_skip,
        )
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
