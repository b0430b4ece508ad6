// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-run engine environment.

use crate::error::EngineError;
use serde_json::Value as JsonValue;
use sf_core::paths::WORKFLOW_LOG_DIR;
use sf_flowscript::{Environment, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// Everything one `run`/`dot` invocation carries around: the flowscript
/// root environment, the loaded parameters, the directory layout, and
/// the run flags.
#[derive(Debug)]
pub struct RunEnvironment {
    pub flow_env: Environment,
    pub parameters: BTreeMap<String, JsonValue>,
    pub work_dir: PathBuf,
    pub workflow_root: PathBuf,
    /// The engine binary invoked from generated run scripts.
    pub engine_path: PathBuf,
    pub skip_sha: bool,
    pub dry_run: bool,
    pub scripts_only: bool,
    pub rerun_all: bool,
}

impl RunEnvironment {
    /// Environment rooted at the current working directory.
    pub fn new() -> io::Result<Self> {
        let work_dir = std::env::current_dir()?;
        let engine_path = std::env::current_exe()?;
        Ok(Self::with_work_dir(work_dir, engine_path))
    }

    /// Environment rooted at an explicit directory (tests, embedding).
    pub fn with_work_dir(work_dir: PathBuf, engine_path: PathBuf) -> Self {
        let workflow_root = work_dir.join(WORKFLOW_LOG_DIR);
        RunEnvironment {
            flow_env: Environment::global(),
            parameters: BTreeMap::new(),
            work_dir,
            workflow_root,
            engine_path,
            skip_sha: false,
            dry_run: false,
            scripts_only: false,
            rerun_all: false,
        }
    }

    /// Bind external parameters into the flowscript root environment.
    ///
    /// Strings bind as strings; numbers bind as integers (fractions
    /// truncate). Anything else fails the load.
    pub fn bind_parameters(
        &mut self,
        parameters: BTreeMap<String, JsonValue>,
    ) -> Result<(), EngineError> {
        for (name, value) in &parameters {
            match value {
                JsonValue::String(text) => {
                    self.flow_env.assign(name, Value::Str(text.clone()));
                }
                JsonValue::Number(number) => {
                    let as_int = number
                        .as_i64()
                        .or_else(|| number.as_f64().map(|f| f as i64))
                        .ok_or_else(|| EngineError::Parameter { name: name.clone() })?;
                    self.flow_env.assign(name, Value::Int(as_int));
                }
                _ => return Err(EngineError::Parameter { name: name.clone() }),
            }
        }
        self.parameters = parameters;
        Ok(())
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
