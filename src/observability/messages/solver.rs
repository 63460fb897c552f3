// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for solver provisioning and queries.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The solver subprocess was started.
///
/// # Log Level
/// `info!` - Provisioning step
pub struct SolverSpawned<'a> {
    pub command: &'a str,
    pub args: &'a [String],
}

impl Display for SolverSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Started solver '{}' {}", self.command, self.args.join(" "))
    }
}

impl StructuredLog for SolverSpawned<'_> {
    fn log(&self) {
        tracing::info!(command = self.command, args = ?self.args, "{}", self);
    }
}

/// The solver answered its sanity query.
///
/// # Log Level
/// `info!` - Provisioning complete
pub struct SolverReady<'a> {
    pub command: &'a str,
}

impl Display for SolverReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Solver '{}' passed its sanity check", self.command)
    }
}

impl StructuredLog for SolverReady<'_> {
    fn log(&self) {
        tracing::info!(command = self.command, "{}", self);
    }
}

/// Provisioning failed.
///
/// # Log Level
/// `error!` - Fatal for bootstrap
pub struct SolverProvisioningFailed<'a> {
    pub command: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SolverProvisioningFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to provision solver '{}': {}", self.command, self.error)
    }
}

impl StructuredLog for SolverProvisioningFailed<'_> {
    fn log(&self) {
        tracing::error!(command = self.command, error = %self.error, "{}", self);
    }
}

/// Start of a solver query.
///
/// # Log Level
/// `debug!` - Per-query tracing
pub struct QueryStarted {
    pub query: u64,
}

impl Display for QueryStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "start of query #{}", self.query)
    }
}

impl StructuredLog for QueryStarted {
    fn log(&self) {
        tracing::debug!(query = self.query, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("solver_query", span_name = name, query = self.query)
    }
}

/// End of a solver query.
///
/// # Log Level
/// `debug!` - Per-query tracing
pub struct QueryFinished {
    pub query: u64,
    pub response_lines: usize,
}

impl Display for QueryFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "end of query #{}", self.query)
    }
}

impl StructuredLog for QueryFinished {
    fn log(&self) {
        tracing::debug!(
            query = self.query,
            response_lines = self.response_lines,
            "{}",
            self
        );
    }
}

/// A query did not complete.
///
/// # Log Level
/// `warn!` - The engine sees an error status
pub struct QueryFailed<'a> {
    pub query: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for QueryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "query #{} failed: {}", self.query, self.error)
    }
}

impl StructuredLog for QueryFailed<'_> {
    fn log(&self) {
        tracing::warn!(query = self.query, error = %self.error, "{}", self);
    }
}

/// A query was answered locally because the solver could not parse it.
///
/// # Log Level
/// `warn!` - The engine sees an error response
pub struct QueryRejected<'a> {
    pub query: u64,
    pub reason: &'a str,
}

impl Display for QueryRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "query #{} rejected: {}", self.query, self.reason)
    }
}

impl StructuredLog for QueryRejected<'_> {
    fn log(&self) {
        tracing::warn!(query = self.query, reason = self.reason, "{}", self);
    }
}

/// The solver context was reset.
///
/// # Log Level
/// `debug!` - Routine between requests
pub struct SolverRefreshed {
    pub query: u64,
}

impl Display for SolverRefreshed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "solver context reset (query #{})", self.query)
    }
}

impl StructuredLog for SolverRefreshed {
    fn log(&self) {
        tracing::debug!(query = self.query, "{}", self);
    }
}
