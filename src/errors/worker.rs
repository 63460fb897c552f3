// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by the worker runtime.

use thiserror::Error;

use super::{EngineError, SolverError};

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// The worker could not reach the ready state.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("engine bootstrap failed: {0}")]
    Engine(#[source] EngineError),

    #[error("solver bootstrap failed: {0}")]
    Solver(#[source] SolverError),

    #[error("filesystem bootstrap failed: {0}")]
    Filesystem(String),

    #[error("bootstrap sources closed before the worker became ready")]
    Incomplete,
}

/// Errors that end the worker loop.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// A fault escaped dispatch because the policy was `Propagate`.
    #[error("verification fault while processing '{fname}': {source}")]
    Fault {
        fname: String,
        #[source]
        source: EngineError,
    },

    #[error("host framing error: {0}")]
    HostFraming(#[source] tokio_util::codec::LinesCodecError),

    #[error("failed to encode message for host: {0}")]
    Encode(#[source] serde_json::Error),
}
