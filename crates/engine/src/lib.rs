// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sf-engine: from expanded shell lines to executed jobs.
//!
//! The task builder turns expanded lines into a dependency-annotated
//! task list (deciding which tasks can reuse prior jobs), the generator
//! materializes per-job directories with run scripts, and the two
//! executors either run jobs sequentially on the local machine or submit
//! them to a cluster scheduler with hold dependencies.

pub mod builder;
pub mod cluster;
pub mod dag;
mod env;
mod error;
pub mod generate;
pub mod local;

pub use builder::{expand_workflow, ShellTaskBuilder, TaskError};
pub use cluster::execute_cluster;
pub use dag::create_dag;
pub use env::RunEnvironment;
pub use error::{EngineError, ExecutionError};
pub use generate::{generate_task_scripts, GeneratedScript, TaskScripts};
pub use local::{execute_local, execute_one_task};
