// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the solver bridge.

use std::io;
use thiserror::Error;

/// Result type for solver bridge operations.
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors raised while provisioning or talking to the solver subprocess.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The solver binary could not be started.
    #[error("failed to spawn solver '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Writing a query to the solver's stdin failed.
    #[error("failed to write to solver: {0}")]
    WriteFailed(#[source] io::Error),

    /// Reading the solver's stdout failed.
    #[error("failed to read from solver: {0}")]
    ReadFailed(#[source] io::Error),

    /// The solver closed its stdout before finishing a response.
    #[error("solver channel closed while waiting for query #{query}")]
    ChannelClosed { query: u64 },

    /// The sanity query did not produce the expected answer.
    #[error("solver sanity check failed: expected '{expected}', got '{actual}'")]
    SanityCheckFailed { expected: String, actual: String },

    /// An earlier round trip failed part way, so responses can no longer
    /// be matched to queries.
    #[error("solver channel out of sync since an earlier failure; refusing query #{query}")]
    Desynchronized { query: u64 },

    /// A previous caller panicked while holding the channel.
    #[error("solver channel lock poisoned")]
    Poisoned,

    /// Provisioning ended without a ready or failure signal.
    #[error("solver provisioning ended unexpectedly")]
    ProvisioningAborted,
}
