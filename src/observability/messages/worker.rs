// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the request queue, readiness gate and bootstrap.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A request arrived before bootstrap finished and was buffered.
///
/// # Log Level
/// `debug!` - Routine queueing
pub struct RequestBuffered<'a> {
    pub fname: &'a str,
    pub queued: usize,
}

impl Display for RequestBuffered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker not ready, buffered request for '{}' ({} queued)",
            self.fname, self.queued
        )
    }
}

impl StructuredLog for RequestBuffered<'_> {
    fn log(&self) {
        tracing::debug!(fname = self.fname, queued = self.queued, "{}", self);
    }
}

/// Bootstrap finished; the worker is about to announce readiness.
///
/// # Log Level
/// `info!` - Lifecycle transition
pub struct WorkerReady {
    pub buffered: usize,
    pub elapsed: Duration,
}

impl Display for WorkerReady {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker ready after {:?}, draining {} buffered request(s)",
            self.elapsed, self.buffered
        )
    }
}

impl StructuredLog for WorkerReady {
    fn log(&self) {
        tracing::info!(
            buffered = self.buffered,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}",
            self
        );
    }
}

/// A bootstrap component reported progress.
///
/// # Log Level
/// `info!` - Operational status
pub struct BootstrapProgress<'a> {
    pub message: &'a str,
}

impl Display for BootstrapProgress<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Bootstrap: {}", self.message)
    }
}

impl StructuredLog for BootstrapProgress<'_> {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}

/// Bootstrap failed; the worker will never become ready.
///
/// # Log Level
/// `error!` - Fatal
pub struct BootstrapFailed<'a> {
    pub error: &'a dyn std::error::Error,
    pub dropped: usize,
}

impl Display for BootstrapFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bootstrap failed, dropping {} buffered request(s): {}",
            self.dropped, self.error
        )
    }
}

impl StructuredLog for BootstrapFailed<'_> {
    fn log(&self) {
        tracing::error!(
            dropped = self.dropped,
            error = %self.error,
            "{}",
            self
        );
    }
}

/// One request is being run to completion.
///
/// # Log Level
/// `info!` - Start of a unit of work
pub struct VerificationStarted<'a> {
    pub fname: &'a str,
    pub args: &'a [String],
}

impl Display for VerificationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Verifying '{}' with {} argument(s)",
            self.fname,
            self.args.len()
        )
    }
}

impl StructuredLog for VerificationStarted<'_> {
    fn log(&self) {
        tracing::info!(fname = self.fname, args = ?self.args, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("verification", span_name = name, fname = self.fname)
    }
}

/// A request ran to completion.
///
/// # Log Level
/// `info!` - End of a unit of work
pub struct VerificationFinished<'a> {
    pub fname: &'a str,
    pub exit_code: i32,
    pub duration: Duration,
}

impl Display for VerificationFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Finished '{}' with exit code {} in {:?}",
            self.fname, self.exit_code, self.duration
        )
    }
}

impl StructuredLog for VerificationFinished<'_> {
    fn log(&self) {
        tracing::info!(
            fname = self.fname,
            exit_code = self.exit_code,
            duration_ms = self.duration.as_millis() as u64,
            "{}",
            self
        );
    }
}

/// An engine fault was converted into a failing completion.
///
/// # Log Level
/// `warn!` - Recovered failure
pub struct FaultCaught<'a> {
    pub fname: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FaultCaught<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Engine fault while verifying '{}': {}", self.fname, self.error)
    }
}

impl StructuredLog for FaultCaught<'_> {
    fn log(&self) {
        tracing::warn!(fname = self.fname, error = %self.error, "{}", self);
    }
}

/// A host line could not be decoded and was skipped.
///
/// # Log Level
/// `warn!` - Bad input
pub struct MalformedHostMessage<'a> {
    pub line: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MalformedHostMessage<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring malformed host message: {}", self.error)
    }
}

impl StructuredLog for MalformedHostMessage<'_> {
    fn log(&self) {
        tracing::warn!(line = self.line, error = %self.error, "{}", self);
    }
}

/// The host closed its input.
///
/// # Log Level
/// `info!` - Lifecycle transition
pub struct HostClosed {
    pub pending: usize,
    pub ready: bool,
}

impl Display for HostClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.ready {
            write!(f, "Host closed input, shutting down")
        } else {
            write!(
                f,
                "Host closed input while booting, {} request(s) still buffered",
                self.pending
            )
        }
    }
}

impl StructuredLog for HostClosed {
    fn log(&self) {
        tracing::info!(pending = self.pending, ready = self.ready, "{}", self);
    }
}
