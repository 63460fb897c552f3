// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::context::WorkerContext;
use crate::errors::{ResolverError, SolverResult};
use crate::observability::messages::engine::MalformedEngineMessage;
use crate::observability::messages::StructuredLog;

/// Something an engine instance produced while running.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Stdout(String),
    Stderr(String),
    /// Status text; `None` clears it.
    Progress(Option<String>),
    /// Out-of-band interactive message.
    Message(Value),
}

/// Everything an engine instance can reach outside itself.
///
/// Owned by exactly one instance. Solver and filesystem are shared with the
/// rest of the worker; file overrides are private to this instance.
pub struct EngineHost {
    context: WorkerContext,
    overrides: HashMap<String, Arc<[u8]>>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHost {
    pub fn new(context: WorkerContext, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self {
            context,
            overrides: HashMap::new(),
            events,
        }
    }

    pub fn ask(&self, query: &str) -> SolverResult<String> {
        self.context.solver.ask(query)
    }

    pub fn refresh(&self) -> SolverResult<()> {
        self.context.solver.refresh()
    }

    /// Where shared library files are mounted.
    pub fn root(&self) -> &str {
        self.context.filesystem.root()
    }

    pub fn index(&self) -> Arc<[u8]> {
        self.context.filesystem.index()
    }

    pub fn depcache(&self) -> Arc<[u8]> {
        self.context.filesystem.depcache()
    }

    /// Contents of `path` as this instance sees them.
    ///
    /// Overrides win. Paths under the filesystem root are resolved through
    /// the shared cache, fetching on first use. Anything else is absent.
    pub fn read_file(&self, path: &str) -> Result<Option<Arc<[u8]>>, ResolverError> {
        if let Some(bytes) = self.overrides.get(path) {
            return Ok(Some(Arc::clone(bytes)));
        }
        let Some(relative) = self.context.filesystem.relative_path(path) else {
            return Ok(None);
        };
        let events = &self.events;
        let mut progress = |status: Option<String>| {
            let _ = events.send(EngineEvent::Progress(status));
        };
        self.context
            .filesystem
            .resolve(relative, &mut progress)
            .map(Some)
    }

    /// Replace what this instance sees at `path`.
    pub fn write_file(&mut self, path: &str, contents: &[u8]) {
        self.overrides.insert(path.to_string(), Arc::from(contents));
    }

    pub fn stdout(&self, chunk: &str) {
        self.emit(EngineEvent::Stdout(chunk.to_string()));
    }

    pub fn stderr(&self, chunk: &str) {
        self.emit(EngineEvent::Stderr(chunk.to_string()));
    }

    pub fn progress(&self, status: Option<String>) {
        self.emit(EngineEvent::Progress(status));
    }

    /// Forward an interactive message; text that is not JSON is passed on as
    /// a JSON string.
    pub fn message(&self, text: &str) {
        let value = serde_json::from_str(text).unwrap_or_else(|error| {
            MalformedEngineMessage { error: &error }.log();
            Value::String(text.to_string())
        });
        self.emit(EngineEvent::Message(value));
    }

    fn emit(&self, event: EngineEvent) {
        // the receiver is gone only once nobody cares about this instance
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::context_with;

    fn host() -> (
        tempfile::TempDir,
        EngineHost,
        mpsc::UnboundedReceiver<EngineEvent>,
    ) {
        let (dir, context) = context_with(&[("Prims.fst", "module Prims")]);
        let (tx, rx) = mpsc::unbounded_channel();
        (dir, EngineHost::new(context, tx), rx)
    }

    #[test]
    fn test_reads_under_root_go_through_the_shared_cache() {
        let (_dir, host, mut rx) = host();

        let bytes = host.read_file("/fstar/Prims.fst").unwrap().unwrap();
        assert_eq!(&*bytes, b"module Prims");
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::Progress(Some("Fetching Prims.fst…".to_string()))
        );
        assert_eq!(rx.try_recv().unwrap(), EngineEvent::Progress(None));

        host.read_file("/fstar/Prims.fst").unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reads_outside_root_are_absent() {
        let (_dir, host, _rx) = host();
        assert!(host.read_file("A.fst").unwrap().is_none());
        assert!(host.read_file("/etc/hostname").unwrap().is_none());
    }

    #[test]
    fn test_missing_file_under_root_is_a_resolver_error() {
        let (_dir, host, _rx) = host();
        let err = host.read_file("/fstar/Missing.fst").unwrap_err();
        assert_eq!(err.path, "Missing.fst");
    }

    #[test]
    fn test_overrides_shadow_everything() {
        let (_dir, mut host, _rx) = host();
        host.write_file("A.fst", b"module A");
        host.write_file("/fstar/Prims.fst", b"module Patched");

        assert_eq!(&*host.read_file("A.fst").unwrap().unwrap(), b"module A");
        assert_eq!(
            &*host.read_file("/fstar/Prims.fst").unwrap().unwrap(),
            b"module Patched"
        );
    }

    #[test]
    fn test_messages_are_parsed_as_json() {
        let (_dir, host, mut rx) = host();
        host.message(r#"{"kind":"message","level":"info"}"#);
        host.message("not json");

        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::Message(serde_json::json!({"kind": "message", "level": "info"}))
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::Message(Value::String("not json".to_string()))
        );
    }
}
