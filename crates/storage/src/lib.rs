// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sf-storage: persistence side of the workflow engine.
//!
//! File fingerprinting with a SQLite-backed SHA-256 cache and
//! content-addressed backups, file-log creation and change detection,
//! follow-up probes for jobs that stopped reporting, and the scanner
//! that rebuilds [`sf_core::WorkflowLog`] values from the on-disk log
//! tree of prior runs.

pub mod cache;
pub mod filelog;
pub mod probe;
pub mod scanner;

pub use cache::{Cache, FileStat, MAX_CONTENT_LOG_SIZE};
pub use filelog::create_file_logs;
pub use scanner::{collect_logs, collect_logs_for_one_job, collect_logs_for_one_work, ScanError, WorkflowLogs};
