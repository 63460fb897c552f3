// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while reading and validating the worker configuration.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading a worker configuration file
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected schema
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A field holds a value the worker cannot run with
    InvalidValue {
        /// Dotted path of the offending field, e.g. `solver.command`
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config '{}': {}", path.display(), source)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}
