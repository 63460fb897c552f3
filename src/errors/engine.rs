// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by engine instances and the lazy filesystem, plus the
//! per-call policy that decides what happens to them.

use serde::Deserialize;
use std::io;
use thiserror::Error;

use super::SolverError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// A dependency file could not be fetched from the origin.
///
/// Fatal for the instance that asked for it; the shared cache is left
/// untouched so other paths keep resolving.
#[derive(Error, Debug)]
#[error("failed to fetch '{path}': {source}")]
pub struct ResolverError {
    pub path: String,
    #[source]
    pub source: io::Error,
}

/// Faults raised while building or running an engine instance.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine binary could not be read, compiled or validated.
    #[error("failed to load engine: {0}")]
    Load(String),

    /// A fresh instance could not be created.
    #[error("failed to instantiate engine: {0}")]
    Instantiate(String),

    /// The engine does not provide an entry point the caller needs.
    #[error("engine does not export '{0}'")]
    MissingExport(&'static str),

    /// The engine trapped or otherwise aborted mid-run.
    #[error("engine fault: {0}")]
    Fault(String),

    /// The engine panicked (in-process backends only).
    #[error("engine panicked: {0}")]
    Panicked(String),

    /// The engine produced bytes that are not valid UTF-8 / JSON.
    #[error("malformed engine output: {0}")]
    MalformedOutput(String),

    /// A required dependency could not be fetched.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// The solver bridge failed outside of an engine query.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// How a one-shot run treats faults.
///
/// `Catch` turns a fault into a completion result with a sentinel exit code
/// and whatever output was captured. `Propagate` hands the fault back to the
/// caller, which for the worker means terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    #[default]
    Catch,
    Propagate,
}
