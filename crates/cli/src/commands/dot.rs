// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shellflow dot`

use anyhow::Context;
use clap::Args;
use sf_core::Configuration;
use sf_engine::{create_dag, expand_workflow, RunEnvironment};
use sf_storage::Cache;
use std::path::PathBuf;

#[derive(Args)]
pub struct DotArgs {
    /// Parameter file (JSON map of name → string or number)
    #[arg(long)]
    pub param: Option<PathBuf>,

    /// Workflow file
    pub workflow: PathBuf,
}

pub fn run(args: DotArgs) -> anyhow::Result<()> {
    let mut env = RunEnvironment::new()?;
    let parameters = super::load_parameters(args.param.as_deref())?;
    env.bind_parameters(parameters)?;

    let config = Configuration::load()?;
    let content = std::fs::read_to_string(&args.workflow)
        .with_context(|| format!("cannot read workflow {}", args.workflow.display()))?;

    let cache = Cache::new(&env.workflow_root);
    let builder = expand_workflow(&cache, &env, config, &content)?;
    println!("{}", create_dag(&builder));
    Ok(())
}
