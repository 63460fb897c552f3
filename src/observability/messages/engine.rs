// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for engine loading, instances and sessions.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// The engine module was read from disk.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use verification_worker::observability::messages::engine::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module_path: "engine/verifier.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module_path: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded engine module: {} ({} bytes)",
            self.module_path, self.size_bytes
        )
    }
}

impl StructuredLog for ModuleLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            module_path = self.module_path,
            size_bytes = self.size_bytes,
            "{}",
            self
        );
    }
}

/// Loading the engine module failed.
///
/// # Log Level
/// `error!` - Fatal for bootstrap
pub struct ModuleLoadFailed<'a> {
    pub module_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load engine module '{}': {}",
            self.module_path, self.error
        )
    }
}

impl StructuredLog for ModuleLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(module_path = self.module_path, error = %self.error, "{}", self);
    }
}

/// The engine module compiled and is ready to instantiate.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModuleCompiled<'a> {
    pub module_path: &'a str,
    pub duration: Duration,
}

impl Display for ModuleCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled engine module {} in {:?}",
            self.module_path, self.duration
        )
    }
}

impl StructuredLog for ModuleCompiled<'_> {
    fn log(&self) {
        tracing::info!(
            module_path = self.module_path,
            duration_ms = self.duration.as_millis() as u64,
            "{}",
            self
        );
    }
}

/// A fresh engine instance was built.
///
/// # Log Level
/// `debug!` - One per request
pub struct InstanceCreated<'a> {
    pub args: &'a [String],
    pub overridden: Option<&'a str>,
}

impl Display for InstanceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.overridden {
            Some(path) => write!(
                f,
                "Created engine instance ({} args, overriding {})",
                self.args.len(),
                path
            ),
            None => write!(f, "Created engine instance ({} args)", self.args.len()),
        }
    }
}

impl StructuredLog for InstanceCreated<'_> {
    fn log(&self) {
        tracing::debug!(args = ?self.args, overridden = ?self.overridden, "{}", self);
    }
}

/// A persistent session was opened.
///
/// # Log Level
/// `info!` - Session lifecycle
pub struct SessionOpened<'a> {
    pub fname: &'a str,
}

impl Display for SessionOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Opened interactive session for '{}'", self.fname)
    }
}

impl StructuredLog for SessionOpened<'_> {
    fn log(&self) {
        tracing::info!(fname = self.fname, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("session", span_name = name, fname = self.fname)
    }
}

/// One query is being evaluated by a session's engine.
///
/// # Log Level
/// `debug!` - One per query
pub struct SessionQuery<'a> {
    pub fname: &'a str,
    /// The query's `query-id`, when it has one.
    pub query_id: Option<&'a str>,
}

impl Display for SessionQuery<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.query_id {
            Some(id) => write!(f, "Evaluating query '{}' in session for '{}'", id, self.fname),
            None => write!(f, "Evaluating query in session for '{}'", self.fname),
        }
    }
}

impl StructuredLog for SessionQuery<'_> {
    fn log(&self) {
        tracing::debug!(fname = self.fname, query_id = ?self.query_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "session_query",
            span_name = name,
            fname = self.fname,
            query_id = ?self.query_id
        )
    }
}

/// The engine sent an interactive message that is not JSON.
///
/// # Log Level
/// `warn!` - Forwarded as a plain string
pub struct MalformedEngineMessage<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for MalformedEngineMessage<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Engine message is not valid JSON: {}", self.error)
    }
}

impl StructuredLog for MalformedEngineMessage<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_query_names_the_query_when_known() {
        let with_id = SessionQuery {
            fname: "A.fst",
            query_id: Some("7"),
        };
        assert_eq!(
            with_id.to_string(),
            "Evaluating query '7' in session for 'A.fst'"
        );

        let without_id = SessionQuery {
            fname: "A.fst",
            query_id: None,
        };
        assert_eq!(without_id.to_string(), "Evaluating query in session for 'A.fst'");
    }
}
