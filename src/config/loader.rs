// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ENGINE_MODULE, DEFAULT_FS_ORIGIN, DEFAULT_FS_ROOT, DEFAULT_SANITY_ANSWER,
    DEFAULT_SANITY_QUERY, DEFAULT_SOLVER_ARGS, DEFAULT_SOLVER_COMMAND, MIN_FUEL_LIMIT,
};
use crate::errors::{ConfigError, ConfigResult, FaultPolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level worker configuration.
///
/// Every section is optional; a missing file or an empty document yields a
/// worker that runs `z3` against `engine/verifier.wasm` with library files
/// under `lib/`.
///
/// # Example
/// ```yaml
/// engine:
///   module: build/verifier.wasm
///   fuel_limit: 400000000
/// solver:
///   command: /usr/local/bin/z3
///   options:
///     smt.random_seed: 7
/// filesystem:
///   origin: build/lib
///   root: /fstar/
/// worker:
///   fault_policy: catch
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub solver: SolverConfig,
    pub filesystem: FilesystemConfig,
    pub worker: WorkerConfig,
}

/// Where the compiled engine lives and how far it may run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub module: PathBuf,
    /// Instruction budget per instance; unlimited when absent.
    pub fuel_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module: PathBuf::from(DEFAULT_ENGINE_MODULE),
            fuel_limit: None,
        }
    }
}

/// How to start the solver and prove it is alive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Layered over the built-in solver options; same keys replace them.
    pub options: BTreeMap<String, SolverOptionValue>,
    pub sanity_query: String,
    pub expected_answer: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_SOLVER_COMMAND.to_string(),
            args: DEFAULT_SOLVER_ARGS.iter().map(|s| s.to_string()).collect(),
            options: BTreeMap::new(),
            sanity_query: DEFAULT_SANITY_QUERY.to_string(),
            expected_answer: DEFAULT_SANITY_ANSWER.to_string(),
        }
    }
}

/// A solver option value as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SolverOptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for SolverOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverOptionValue::Bool(b) => write!(f, "{}", b),
            SolverOptionValue::Int(i) => write!(f, "{}", i),
            SolverOptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Where library files come from and where the engine sees them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    pub origin: PathBuf,
    pub root: String,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            origin: PathBuf::from(DEFAULT_FS_ORIGIN),
            root: DEFAULT_FS_ROOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub fault_policy: FaultPolicy,
}

impl Config {
    /// Reject values the worker cannot start with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.solver.command.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "solver.command",
                reason: "must not be empty".to_string(),
            });
        }
        if self.solver.expected_answer.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "solver.expected_answer",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(key) = self
            .solver
            .options
            .keys()
            .find(|key| key.is_empty() || key.contains('=') || key.contains(char::is_whitespace))
        {
            return Err(ConfigError::InvalidValue {
                field: "solver.options",
                reason: format!("'{}' is not a valid option name", key),
            });
        }
        if !self.filesystem.root.starts_with('/') || !self.filesystem.root.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "filesystem.root",
                reason: format!(
                    "'{}' must be an absolute directory ending in '/'",
                    self.filesystem.root
                ),
            });
        }
        if let Some(fuel) = self.engine.fuel_limit {
            if fuel < MIN_FUEL_LIMIT {
                return Err(ConfigError::InvalidValue {
                    field: "engine.fuel_limit",
                    reason: format!("{} is below the minimum of {}", fuel, MIN_FUEL_LIMIT),
                });
            }
        }
        Ok(())
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty document deserializes as null, not as an empty mapping.
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a config from a YAML file
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
