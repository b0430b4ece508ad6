// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scanner over persisted workflow logs.
//!
//! Each child directory of the workflow-log root is one prior run. The
//! scanner classifies every job (pending/running/done/failed), refreshes
//! change-detection flags, and answers the reuse queries the task
//! builder asks. A gzip JSON cache per run directory keeps re-scans
//! cheap: done jobs only get their changed flags re-checked, non-done
//! jobs are fully re-collected to pick up new status.

use crate::cache::Cache;
use crate::probe;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sf_core::joblog::EXIT_CODE_UNREPORTED;
use sf_core::paths::{
    job_dir_name, INPUT_LOG_FILE, LOG_CACHE_FILE, OUTPUT_LOG_FILE, RC_FILE, RUNTIME_FILE,
    SGE_TASK_ID_FILE,
};
use sf_core::{FileLog, JobLog, ShellTask, WorkflowLog, WorkflowMetaData};
use std::collections::BTreeSet;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from scanning the workflow-log tree.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot scan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ScanError {
    fn io(path: &Path, source: io::Error) -> Self {
        ScanError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Logs of every known prior run, oldest first.
#[derive(Debug, Clone, Default)]
pub struct WorkflowLogs(pub Vec<WorkflowLog>);

impl WorkflowLogs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkflowLog> {
        self.0.iter()
    }

    /// Find a prior job this script could reuse.
    ///
    /// A job matches when it is reusable, ran the same shell script, and
    /// declared the same input set. The declared output set is *not*
    /// compared: outputs are considered derivable from the command and
    /// its inputs, so the first match wins even if its declared outputs
    /// differ.
    pub fn search_reusable_job(
        &self,
        shell_script: &str,
        _work_dir: &Path,
        dependent_files: &BTreeSet<String>,
        _creating_files: &BTreeSet<String>,
    ) -> Option<&JobLog> {
        for workflow in &self.0 {
            for job in &workflow.job_logs {
                if job.is_reusable()
                    && job.shell_task.shell_script == shell_script
                    && &job.shell_task.dependent_files == dependent_files
                {
                    debug!(
                        job_root = %job.job_log_root.display(),
                        script = shell_script,
                        "adopting reusable job"
                    );
                    return Some(job);
                }
            }
        }
        None
    }
}

/// Scan every run directory under `log_dir`.
///
/// A missing root is an empty result, not an error. Runs are sorted by
/// start date, oldest first.
pub fn collect_logs(cache: &Cache, log_dir: &Path) -> Result<WorkflowLogs, ScanError> {
    let entries = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(WorkflowLogs::default()),
        Err(err) => return Err(ScanError::io(log_dir, err)),
    };

    let mut logs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| ScanError::io(log_dir, err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(log) = collect_logs_for_one_work(cache, &path)? {
            logs.push(log);
        }
    }

    logs.sort_by_key(|log| log.start_date);
    Ok(WorkflowLogs(logs))
}

/// Scan one run directory, preferring the gzip cache.
///
/// Returns `None` for directories that are not workflow runs (no
/// readable `runtime.json`).
pub fn collect_logs_for_one_work(
    cache: &Cache,
    dir: &Path,
) -> Result<Option<WorkflowLog>, ScanError> {
    if let Some(log) = collect_from_cache(cache, dir)? {
        return Ok(Some(log));
    }
    collect_with_full_scan(cache, dir)
}

/// Refresh a run from its `workflowLogCache.json.gz`.
///
/// Returns `None` when the cache (or the run's `input.json`) is missing,
/// which sends the caller to the full scan. Changed flags are refreshed
/// monotonically: once recorded as changed a job stays changed. Jobs not
/// yet done are fully re-collected.
fn collect_from_cache(cache: &Cache, dir: &Path) -> Result<Option<WorkflowLog>, ScanError> {
    let cache_path = dir.join(LOG_CACHE_FILE);
    let mut workflow_log: WorkflowLog = match read_gzip_json(&cache_path) {
        Ok(log) => log,
        Err(ScanError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(err) => {
            warn!("(ignored) unreadable log cache {}: {}", cache_path.display(), err);
            return Ok(None);
        }
    };

    let top_inputs: Vec<FileLog> = match load_json(&dir.join(INPUT_LOG_FILE)) {
        Ok(inputs) => inputs,
        Err(ScanError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    workflow_log.changed_input = changed_paths(cache, &top_inputs, dir)?;

    for job in &mut workflow_log.job_logs {
        if job.is_done {
            if !job.any_input_changed {
                job.any_input_changed = any_changed(cache, &job.input_files, dir)?;
            }
            if !job.any_output_changed {
                job.any_output_changed = any_changed(cache, &job.output_files, dir)?;
            }
        } else {
            debug!("rescanning {}", job.job_log_root.display());
            let job_root = job.job_log_root.clone();
            let task = job.shell_task.clone();
            *job = collect_logs_for_one_job(cache, &job_root, &task)?;
        }
    }

    write_gzip_json(&cache_path, &workflow_log)?;
    Ok(Some(workflow_log))
}

/// Rebuild a run's log from `runtime.json` and the job directories.
fn collect_with_full_scan(cache: &Cache, dir: &Path) -> Result<Option<WorkflowLog>, ScanError> {
    let metadata: WorkflowMetaData = match load_json(&dir.join(RUNTIME_FILE)) {
        Ok(metadata) => metadata,
        // not a workflow-run directory; skip it
        Err(_) => return Ok(None),
    };

    let top_inputs: Vec<FileLog> = load_json(&dir.join(INPUT_LOG_FILE))?;
    let changed_input = changed_paths(cache, &top_inputs, dir)?;

    let mut job_logs = Vec::with_capacity(metadata.tasks.len());
    for task in &metadata.tasks {
        let job_root = dir.join(job_dir_name(task.id));
        job_logs.push(collect_logs_for_one_job(cache, &job_root, task)?);
    }

    let workflow_log = WorkflowLog {
        workflow_log_root: dir.to_path_buf(),
        workflow_script: metadata.workflow_path.to_string_lossy().to_string(),
        parameter_file: metadata.parameter_file,
        start_date: metadata.date,
        changed_input,
        job_logs,
    };

    write_gzip_json(&dir.join(LOG_CACHE_FILE), &workflow_log)?;
    Ok(Some(workflow_log))
}

/// Classify one job directory.
///
/// An `rc` file decides immediately. Otherwise the local-pid probe, then
/// the cluster probe get a chance to either observe a live process
/// (job still running) or synthesize `rc = 1000` for a vanished one.
/// With no probe handle at all the job counts as pending.
pub fn collect_logs_for_one_job(
    cache: &Cache,
    job_root: &Path,
    task: &ShellTask,
) -> Result<JobLog, ScanError> {
    let rc_path = job_root.join(RC_FILE);
    let rc_content = match std::fs::read_to_string(&rc_path) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut handled =
                probe::follow_up_local(job_root).map_err(|err| ScanError::io(job_root, err))?;
            if !handled {
                handled = probe::follow_up_cluster(job_root)
                    .map_err(|err| ScanError::io(job_root, err))?;
            }
            if handled {
                std::fs::read_to_string(&rc_path).ok()
            } else {
                None
            }
        }
        Err(err) => return Err(ScanError::io(&rc_path, err)),
    };

    let (is_done, mut exit_code, script_exit_code) = match rc_content {
        Some(content) => {
            let code: i32 = content.trim().parse().map_err(|_| ScanError::Parse {
                path: rc_path.clone(),
                message: format!("invalid exit code {:?}", content),
            })?;
            (true, code, code)
        }
        None => (false, -1, -1),
    };

    // input files: presence marks the job as started
    let (input_files, is_started) = match load_json::<Vec<FileLog>>(&job_root.join(INPUT_LOG_FILE))
    {
        Ok(files) => (files, true),
        Err(ScanError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            (Vec::new(), false)
        }
        Err(err) => {
            warn!("(ignored) failed to load input log: {}", err);
            (Vec::new(), false)
        }
    };
    let any_input_changed = any_changed(cache, &input_files, job_root)?;

    let (output_files, output_found) =
        match load_json::<Vec<FileLog>>(&job_root.join(OUTPUT_LOG_FILE)) {
            Ok(files) => (files, true),
            Err(ScanError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                (Vec::new(), false)
            }
            Err(err) => {
                warn!("(ignored) failed to load output log: {}", err);
                (Vec::new(), false)
            }
        };
    let any_output_changed = any_changed(cache, &output_files, job_root)?;

    // a run claiming success without an output log is treated as failed
    if is_done && exit_code == 0 && !output_found {
        exit_code = EXIT_CODE_UNREPORTED;
    }

    let cluster_task_id = match std::fs::read_to_string(job_root.join(SGE_TASK_ID_FILE)) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(ScanError::io(job_root, err)),
    };

    Ok(JobLog {
        job_log_root: job_root.to_path_buf(),
        input_files,
        output_files,
        is_started,
        any_input_changed,
        is_done,
        any_output_changed,
        exit_code,
        script_exit_code,
        shell_task: task.clone(),
        cluster_task_id,
    })
}

fn any_changed(cache: &Cache, files: &[FileLog], context: &Path) -> Result<bool, ScanError> {
    for file in files {
        if cache
            .is_changed(file)
            .map_err(|err| ScanError::io(context, err))?
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn changed_paths(
    cache: &Cache,
    files: &[FileLog],
    context: &Path,
) -> Result<Vec<String>, ScanError> {
    let mut changed = Vec::new();
    for file in files {
        if cache
            .is_changed(file)
            .map_err(|err| ScanError::io(context, err))?
        {
            changed.push(file.rel_path.clone());
        }
    }
    Ok(changed)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let content = std::fs::read(path).map_err(|err| ScanError::io(path, err))?;
    serde_json::from_slice(&content).map_err(|source| ScanError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_gzip_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let file = std::fs::File::open(path).map_err(|err| ScanError::io(path, err))?;
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .map_err(|err| ScanError::io(path, err))?;
    serde_json::from_slice(&content).map_err(|source| ScanError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_gzip_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ScanError> {
    let content = serde_json::to_vec_pretty(value).map_err(|source| ScanError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let file = std::fs::File::create(path).map_err(|err| ScanError::io(path, err))?;
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder
        .write_all(&content)
        .map_err(|err| ScanError::io(path, err))?;
    encoder
        .finish()
        .map_err(|err| ScanError::io(path, err))?;
    Ok(())
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
