// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand implementations.

pub mod dot;
pub mod filelog;
pub mod flowscript;
pub mod run;
pub mod viewlog;

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Load a JSON parameter file: a flat map of name → string or number.
pub fn load_parameters(
    path: Option<&Path>,
) -> anyhow::Result<BTreeMap<String, serde_json::Value>> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };

    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        anyhow::bail!("unknown parameter file type: {}", path.display());
    }

    let content = std::fs::read(path)
        .with_context(|| format!("cannot read parameter file {}", path.display()))?;
    let parameters: BTreeMap<String, serde_json::Value> = serde_json::from_slice(&content)
        .with_context(|| format!("cannot decode parameter file {}", path.display()))?;
    Ok(parameters)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
