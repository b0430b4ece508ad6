// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! A TOML file, searched as `./shellflow.toml` and then
//! `~/.shellflow.toml`; the home-directory file is created from an
//! embedded default when neither exists. `[[Command]]` entries map regex
//! patterns over final shell lines to submission options.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "shellflow.toml";

/// Config file name looked up in the home directory.
pub const HOME_CONFIG_FILE: &str = ".shellflow.toml";

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Errors from loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot decode configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid regular expression in configuration ({pattern:?}): {source}")]
    Regex {
        pattern: String,
        source: regex::Error,
    },
}

/// Per-command-pattern settings.
///
/// Field names match the TOML keys of existing config files, including
/// the historical `DontInheirtPath` spelling; the corrected spelling is
/// accepted as an alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(rename = "RegExp", default)]
    pub reg_exp: String,

    /// Extra argv spliced into the cluster submit command.
    #[serde(rename = "SGEOption", default)]
    pub sge_option: Vec<String>,

    /// Suppress exporting `PATH`/`LD_LIBRARY_PATH` into the job wrapper.
    #[serde(rename = "DontInheirtPath", alias = "DontInheritPath", default)]
    pub dont_inherit_path: bool,

    /// Run locally even under the cluster backend.
    #[serde(rename = "RunImmediate", default)]
    pub run_immediate: bool,
}

impl fmt::Display for CommandConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommandConfig{{RegExp: {:?}, SGEOption: {:?}, DontInheirtPath: {}, RunImmediate: {}}}",
            self.reg_exp, self.sge_option, self.dont_inherit_path, self.run_immediate
        )
    }
}

/// Reserved backend selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    #[serde(rename = "Type", default)]
    pub backend_type: String,
}

/// The decoded configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Extra environment exported into every generated `run.sh`.
    #[serde(rename = "Environment", default)]
    pub environment: BTreeMap<String, String>,

    #[serde(rename = "Backend", default)]
    pub backend: Backend,

    #[serde(rename = "Command", default)]
    pub commands: Vec<CommandConfig>,
}

impl Configuration {
    /// Decode and validate configuration content.
    ///
    /// Every `RegExp` must compile; the first invalid one fails the load.
    pub fn parse(content: &str) -> Result<Configuration, ConfigError> {
        let config: Configuration = toml::from_str(content)?;
        for command in &config.commands {
            Regex::new(&command.reg_exp).map_err(|source| ConfigError::Regex {
                pattern: command.reg_exp.clone(),
                source,
            })?;
        }
        Ok(config)
    }

    /// Load from `./shellflow.toml`, falling back to `~/.shellflow.toml`
    /// (created from the embedded default when absent).
    pub fn load() -> Result<Configuration, ConfigError> {
        Self::load_from(Path::new(LOCAL_CONFIG_FILE))
    }

    /// Like [`Configuration::load`] with an explicit local-file path, for
    /// tests and non-cwd callers.
    pub fn load_from(local_path: &Path) -> Result<Configuration, ConfigError> {
        if local_path.exists() {
            let content = std::fs::read_to_string(local_path)?;
            return Self::parse(&content);
        }

        match home_config_path() {
            Some(home_path) => {
                if !home_path.exists() {
                    std::fs::write(&home_path, DEFAULT_CONFIG)?;
                }
                let content = std::fs::read_to_string(&home_path)?;
                Self::parse(&content)
            }
            None => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// The first `[[Command]]` entry whose pattern matches the shell
    /// line, or an empty default.
    ///
    /// Patterns were validated at load time; one that no longer compiles
    /// is skipped.
    pub fn match_command(&self, shell_script: &str) -> CommandConfig {
        for command in &self.commands {
            if let Ok(pattern) = Regex::new(&command.reg_exp) {
                if pattern.is_match(shell_script) {
                    return command.clone();
                }
            }
        }
        CommandConfig::default()
    }
}

fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HOME_CONFIG_FILE))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
