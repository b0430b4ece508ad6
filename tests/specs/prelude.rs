// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to the shellflow binary.
///
/// Resolves relative to the test binary itself (the test executable
/// lives at `target/debug/deps/specs-<hash>`, the CLI binary two levels
/// up), falling back to the manifest-relative target directory.
pub fn shellflow_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let candidate = debug_dir.join("shellflow");
            if candidate.exists() {
                return candidate;
            }
        }
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("target/debug/shellflow")
}

/// A scratch working directory with its own fake home, so config
/// lookups never touch the real `~/.shellflow.toml`.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("home")).unwrap();
        Workspace { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name))
            .unwrap_or_else(|err| panic!("cannot read {}: {}", name, err))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Run `shellflow <args>` inside the workspace.
    pub fn shellflow(&self, args: &[&str]) -> Output {
        Command::new(shellflow_binary())
            .args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path().join("home"))
            .output()
            .expect("failed to run shellflow")
    }

    /// Run and require success, returning stdout.
    pub fn shellflow_ok(&self, args: &[&str]) -> String {
        let output = self.shellflow(args);
        assert!(
            output.status.success(),
            "shellflow {:?} failed\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// The run directories under `shellflow-wf/`, oldest first.
    pub fn run_dirs(&self) -> Vec<PathBuf> {
        let root = self.dir.path().join("shellflow-wf");
        let Ok(entries) = std::fs::read_dir(&root) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_dir()
                    && !path
                        .file_name()
                        .is_some_and(|name| name.to_string_lossy().starts_with("__"))
            })
            .collect();
        dirs.sort();
        dirs
    }

    /// Parse a run directory's runtime.json.
    pub fn runtime(&self, run_dir: &Path) -> serde_json::Value {
        let content = std::fs::read(run_dir.join("runtime.json")).unwrap();
        serde_json::from_slice(&content).unwrap()
    }
}
