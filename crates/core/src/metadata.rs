// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run metadata persisted as `runtime.json`.

use crate::task::ShellTask;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything about one workflow submission, written once at generation
/// time and read back by the log scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetaData {
    /// Snapshot of the inherited environment (`PATH`, `LD_LIBRARY_PATH`).
    pub env: BTreeMap<String, String>,
    /// Absolute path of the engine binary that ran the workflow.
    pub engine: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    pub date: DateTime<Utc>,
    pub user: String,
    /// The workflow file content, verbatim as submitted.
    pub workflow: String,
    pub workflow_path: PathBuf,
    pub tasks: Vec<ShellTask>,
    pub parameters: BTreeMap<String, serde_json::Value>,
    pub parameter_file: String,
}
