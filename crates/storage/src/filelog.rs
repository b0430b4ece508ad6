// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-log creation.

use crate::cache::Cache;
use chrono::{DateTime, Utc};
use sf_core::filelog::{FileLog, Sha256Sum};
use std::io;
use std::path::Path;

/// Build [`FileLog`] records for a list of paths.
///
/// Each file is stat'ed and hashed through the shared cache. With
/// `skip_sha` the digest field is left empty; change detection does not
/// depend on it.
pub fn create_file_logs(
    cache: &Cache,
    files: &[String],
    skip_sha: bool,
) -> io::Result<Vec<FileLog>> {
    let mut logs = Vec::with_capacity(files.len());

    for file in files {
        let path = Path::new(file);
        let abs_path = std::path::absolute(path)?;
        let stat = cache.stat(path)?;

        let sha256 = if skip_sha {
            Sha256Sum::default()
        } else {
            cache.sha256(path)?
        };

        let modified: DateTime<Utc> = stat.modified.into();
        logs.push(FileLog {
            rel_path: file.clone(),
            abs_path: abs_path.to_string_lossy().to_string(),
            size: stat.size,
            modified,
            sha256,
        });
    }

    Ok(logs)
}

#[cfg(test)]
#[path = "filelog_tests.rs"]
mod tests;
