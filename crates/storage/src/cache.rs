// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File fingerprinting with a persistent SHA-256 cache.
//!
//! The cache context bundles the three per-process caches the engine
//! shares: a stat cache keyed by path, a change-detection cache keyed by
//! relative path, and a SQLite digest cache keyed by `(path, modified,
//! size)` stored at `<workflow_log_root>/files.sqlite3`. All cache and
//! database failures degrade to direct hashing with a logged warning, so
//! a read-only log directory never stops a workflow; only failing to
//! read the target file itself is fatal.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use sf_core::filelog::Sha256Sum;
use sf_core::paths::{BACKUP_DIR, SHA_CACHE_DB};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Files up to this size are gzip-copied into the content-addressed
/// backup store when first hashed (20 MiB).
pub const MAX_CONTENT_LOG_SIZE: u64 = 20 * 1024 * 1024;

/// Size and modification time of a file, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: SystemTime,
}

enum DigestDb {
    Unopened,
    Open(Connection),
    /// Opening failed once; do not retry for the life of this context.
    Unavailable,
}

struct CacheInner {
    db: DigestDb,
    stats: HashMap<PathBuf, FileStat>,
    changed: HashMap<String, bool>,
}

/// Shared fingerprint and stat caches, threaded through the pipeline.
pub struct Cache {
    workflow_log_root: PathBuf,
    max_content_log_size: u64,
    inner: Mutex<CacheInner>,
}

impl Cache {
    pub fn new(workflow_log_root: impl Into<PathBuf>) -> Self {
        Cache {
            workflow_log_root: workflow_log_root.into(),
            max_content_log_size: MAX_CONTENT_LOG_SIZE,
            inner: Mutex::new(CacheInner {
                db: DigestDb::Unopened,
                stats: HashMap::new(),
                changed: HashMap::new(),
            }),
        }
    }

    /// Override the backup size threshold (tests use small values).
    pub fn with_max_content_log_size(mut self, size: u64) -> Self {
        self.max_content_log_size = size;
        self
    }

    pub fn workflow_log_root(&self) -> &Path {
        &self.workflow_log_root
    }

    /// Drop every in-process cache and the database connection.
    ///
    /// The next use reopens the database; rows persist across clears.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.db = DigestDb::Unopened;
        inner.stats.clear();
        inner.changed.clear();
    }

    /// `stat()` with an in-process cache keyed by the path as given.
    pub fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if let Some(stat) = self.inner.lock().stats.get(path) {
            return Ok(*stat);
        }
        let metadata = std::fs::metadata(path)?;
        let stat = FileStat {
            size: metadata.len(),
            modified: metadata.modified()?,
        };
        self.inner.lock().stats.insert(path.to_path_buf(), stat);
        Ok(stat)
    }

    /// Whether the file differs from a recorded log entry.
    ///
    /// Compares modification seconds, modification nanoseconds and size;
    /// the digest is never consulted (the digest cache already conflates
    /// unchanged files). A missing file counts as changed.
    pub fn is_changed(&self, log: &sf_core::FileLog) -> io::Result<bool> {
        if let Some(changed) = self.inner.lock().changed.get(&log.rel_path) {
            return Ok(*changed);
        }

        let stat = match self.stat(Path::new(&log.rel_path)) {
            Ok(stat) => stat,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(true),
            Err(err) => return Err(err),
        };

        let modified: DateTime<Utc> = stat.modified.into();
        let changed = modified.timestamp() != log.modified.timestamp()
            || modified.timestamp_subsec_nanos() != log.modified.timestamp_subsec_nanos()
            || stat.size != log.size;

        self.inner
            .lock()
            .changed
            .insert(log.rel_path.clone(), changed);
        Ok(changed)
    }

    /// SHA-256 of a file, served from the persistent cache when the
    /// `(path, mtime, size)` key matches a prior row.
    ///
    /// On a miss the file is streamed through the hasher; files no larger
    /// than the backup threshold are also teed into the gzip
    /// content-addressed store under `__backup/`.
    pub fn sha256(&self, path: &Path) -> io::Result<Sha256Sum> {
        let stat = self.stat(path)?;
        let key_path = path.to_string_lossy().to_string();
        let key_modified = modified_key(stat.modified);

        if let Some(hex) = self.lookup_digest(&key_path, &key_modified, stat.size) {
            match Sha256Sum::from_hex(&hex) {
                Ok(sum) => {
                    debug!(path = %path.display(), "sha256 cache hit");
                    return Ok(sum);
                }
                Err(message) => warn!("(ignored) corrupt digest cache row: {}", message),
            }
        }

        info!("calculating SHA-256 for {}", path.display());

        let backup_content = stat.size <= self.max_content_log_size;
        let mut file = std::fs::File::open(path)?;
        let mut hasher = Sha256::new();
        let mut content = Vec::new();
        let mut buffer = [0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            if backup_content {
                content.extend_from_slice(&buffer[..n]);
            }
        }
        let sum = Sha256Sum::new(hasher.finalize().to_vec());
        let hex = sum.to_hex();

        if backup_content {
            if let Err(err) = self.write_backup(&hex, &content) {
                warn!("(ignored) cannot write content backup: {}", err);
            }
        }

        self.insert_digest(&key_path, &key_modified, stat.size, &hex);
        Ok(sum)
    }

    fn lookup_digest(&self, path: &str, modified: &str, size: u64) -> Option<String> {
        let mut inner = self.inner.lock();
        let connection = open_db(&mut inner.db, &self.workflow_log_root)?;
        let result = connection
            .query_row(
                "SELECT sha256 FROM Sha256Cache WHERE path = ?1 AND modified = ?2 AND size = ?3",
                rusqlite::params![path, modified, size as i64],
                |row| row.get::<_, String>(0),
            )
            .optional();
        match result {
            Ok(hex) => hex,
            Err(err) => {
                warn!("(ignored) cannot query digest cache: {}", err);
                None
            }
        }
    }

    fn insert_digest(&self, path: &str, modified: &str, size: u64, hex: &str) {
        let mut inner = self.inner.lock();
        let Some(connection) = open_db(&mut inner.db, &self.workflow_log_root) else {
            return;
        };
        let result = connection.execute(
            "INSERT INTO Sha256Cache(path, modified, size, sha256) VALUES(?1, ?2, ?3, ?4)",
            rusqlite::params![path, modified, size as i64, hex],
        );
        if let Err(err) = result {
            warn!("(ignored) cannot record digest in cache: {}", err);
        }
    }

    fn write_backup(&self, hex: &str, content: &[u8]) -> io::Result<()> {
        if hex.len() < 2 {
            return Ok(());
        }
        let backup_dir = self
            .workflow_log_root
            .join(BACKUP_DIR)
            .join(&hex[..1])
            .join(&hex[..2]);
        std::fs::create_dir_all(&backup_dir)?;

        let backup_path = backup_dir.join(format!("{}.gz", hex));
        let file = std::fs::File::create(backup_path)?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(content)?;
        encoder.finish()?;
        Ok(())
    }
}

/// Open (or reuse) the digest database. Every failure downgrades to
/// cache-less operation for the rest of the process.
fn open_db<'a>(db: &'a mut DigestDb, root: &Path) -> Option<&'a Connection> {
    if let DigestDb::Unopened = db {
        *db = match try_open_db(root) {
            Ok(connection) => DigestDb::Open(connection),
            Err(message) => {
                warn!("(ignored) {}", message);
                DigestDb::Unavailable
            }
        };
    }
    match db {
        DigestDb::Open(connection) => Some(connection),
        _ => None,
    }
}

fn try_open_db(root: &Path) -> Result<Connection, String> {
    std::fs::create_dir_all(root)
        .map_err(|err| format!("cannot create workflow log directory: {}", err))?;

    let connection = Connection::open(root.join(SHA_CACHE_DB))
        .map_err(|err| format!("cannot open digest cache database: {}", err))?;

    connection
        .execute(
            "CREATE TABLE IF NOT EXISTS Sha256Cache(\
             path TEXT, modified TEXT, size INTEGER, sha256 TEXT, \
             PRIMARY KEY(path, modified, size))",
            [],
        )
        .map_err(|err| format!("cannot create digest cache table: {}", err))?;

    Ok(connection)
}

/// Stable, locale-free text key for an mtime: RFC 3339 UTC with
/// nanosecond precision.
fn modified_key(modified: SystemTime) -> String {
    let datetime: DateTime<Utc> = modified.into();
    datetime.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
