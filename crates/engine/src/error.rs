// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use sf_core::ShellTask;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A child process reported a non-zero exit.
#[derive(Debug, Clone)]
pub struct ExecutionError {
    pub exit_code: i32,
    pub job_root: PathBuf,
    pub shell_task: ShellTask,
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exit status {}: {}",
            self.exit_code, self.shell_task.shell_script
        )
    }
}

impl std::error::Error for ExecutionError {}

/// Errors that can occur while expanding, generating, or executing a
/// workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] sf_core::ConfigError),

    #[error(transparent)]
    Block(#[from] sf_workflow::BlockError),

    #[error(transparent)]
    Expand(#[from] sf_workflow::ExpandError),

    #[error(transparent)]
    Scan(#[from] sf_storage::ScanError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("cannot submit to cluster: {0}")]
    Submit(String),

    #[error("unknown parameter type for {name}")]
    Parameter { name: String },
}
