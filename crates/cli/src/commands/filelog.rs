// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shellflow filelog` — used by generated run scripts to record the
//! state of declared inputs and outputs.

use clap::Args;
use sf_core::paths::WORKFLOW_LOG_DIR;
use sf_storage::{create_file_logs, Cache};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args)]
pub struct FilelogArgs {
    /// Output JSON file (stdout when omitted or `-`)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Record stat metadata only, with an empty digest
    #[arg(long)]
    pub skip_sha: bool,

    /// Files to log
    pub paths: Vec<String>,
}

pub fn run(args: FilelogArgs) -> anyhow::Result<()> {
    let cache = Cache::new(WORKFLOW_LOG_DIR);
    let logs = create_file_logs(&cache, &args.paths, args.skip_sha)?;
    let content = serde_json::to_vec_pretty(&logs)?;

    match args.output.as_deref() {
        None => {
            std::io::stdout().write_all(&content)?;
            println!();
        }
        Some(path) if path.as_os_str() == "-" => {
            std::io::stdout().write_all(&content)?;
            println!();
        }
        Some(path) => std::fs::write(path, content)?,
    }
    Ok(())
}
