// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use tokio::sync::mpsc;

use super::adapter::EngineAdapter;
use super::host::EngineEvent;
use crate::config::consts::IDE_FLAG;
use crate::errors::{EngineError, EngineResult};
use crate::observability::messages::engine::{SessionOpened, SessionQuery};
use crate::observability::messages::StructuredLog;
use crate::traits::VerificationEngine;

/// A persistent interactive engine instance.
///
/// Sessions bypass the request queue. Callers running more than one at a
/// time must keep their solver use from overlapping.
pub struct Session {
    engine: Box<dyn VerificationEngine>,
    fname: String,
}

/// Out-of-band events from a session's engine.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EventStream {
    pub async fn next(&mut self) -> Option<EngineEvent> {
        self.receiver.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EngineEvent> {
        self.receiver.try_recv().ok()
    }

    /// Every event queued so far.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl EngineAdapter {
    /// Start an interactive session on `fname`.
    ///
    /// `--ide` is added to `args` unless present, then `fname` is appended.
    pub fn open_session(
        &self,
        fname: &str,
        contents: Option<&str>,
        args: &[String],
    ) -> EngineResult<(Session, EventStream)> {
        let mut args = args.to_vec();
        if !args.iter().any(|arg| arg == IDE_FLAG) {
            args.push(IDE_FLAG.to_string());
        }
        args.push(fname.to_string());

        let (sender, receiver) = mpsc::unbounded_channel();
        let mut engine = self.fresh_instance(args, contents.map(|c| (fname, c)), sender)?;
        engine.ide_init(fname)?;
        SessionOpened { fname }.log();

        Ok((
            Session {
                engine,
                fname: fname.to_string(),
            },
            EventStream { receiver },
        ))
    }
}

impl Session {
    pub fn fname(&self) -> &str {
        &self.fname
    }

    /// Replace the session file's contents without rebuilding the instance.
    pub fn update_file(&mut self, contents: &str) {
        self.engine
            .host_mut()
            .write_file(&self.fname, contents.as_bytes());
    }

    /// Run one query synchronously and return the engine's response.
    pub fn query(&mut self, query: &Value) -> EngineResult<Value> {
        let message = SessionQuery {
            fname: &self.fname,
            query_id: query.get("query-id").and_then(Value::as_str),
        };
        let span = message.span("query");
        let _guard = span.enter();
        message.log();

        let response = self.engine.ide_eval(&query.to_string())?;
        serde_json::from_str(&response).map_err(|e| EngineError::MalformedOutput(e.to_string()))
    }

    /// Run one query and hand the response to `callback`.
    ///
    /// The callback currently runs before this returns; callers should not
    /// depend on that.
    pub fn query_with<F>(&mut self, query: &Value, callback: F) -> EngineResult<()>
    where
        F: FnOnce(Value),
    {
        callback(self.query(query)?);
        Ok(())
    }
}
