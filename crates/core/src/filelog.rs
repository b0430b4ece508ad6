// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File fingerprint records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A SHA-256 digest, rendered as lowercase hex in JSON.
///
/// An empty digest (the `--skip-sha` case) serializes as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sha256Sum(Vec<u8>);

impl Sha256Sum {
    pub fn new(bytes: Vec<u8>) -> Self {
        Sha256Sum(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(self.0.len() * 2);
        for byte in &self.0 {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }

    pub fn from_hex(hex: &str) -> Result<Self, String> {
        if hex.len() % 2 != 0 {
            return Err(format!("odd-length hex digest: {:?}", hex));
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let pair = hex
                .get(i..i + 2)
                .ok_or_else(|| format!("invalid hex digest: {:?}", hex))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| format!("invalid hex digest: {:?}", hex))?;
            bytes.push(byte);
        }
        Ok(Sha256Sum(bytes))
    }
}

impl fmt::Display for Sha256Sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Sha256Sum {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256Sum {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Sha256Sum::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Metadata snapshot of one file, written into `input.json`/`output.json`.
///
/// The modification time keeps nanosecond resolution through JSON;
/// change detection compares seconds and nanoseconds independently and
/// never consults the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLog {
    pub rel_path: String,
    pub abs_path: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub sha256: Sha256Sum,
}

impl fmt::Display for FileLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileLog{{{}, {}}}", self.rel_path, self.size)
    }
}

#[cfg(test)]
#[path = "filelog_tests.rs"]
mod tests;
