// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scripted in-process engines for tests.
//!
//! The verifying stub reads every file listed under `files` in the index
//! (through the shared cache), then reads its target file. Lines starting
//! with `(` are sent to the solver and echoed with the answer; a line that is
//! exactly `fail` makes the run fail.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::engine::EngineHost;
use crate::errors::{EngineError, EngineResult};
use crate::traits::{EngineFactory, EngineLoader, VerificationEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    Verify,
    /// Print a line, then fault.
    Fault,
    /// Print a line, then panic.
    Panic,
}

pub struct StubEngineFactory {
    behavior: StubBehavior,
    instances: AtomicUsize,
    last_args: Mutex<Vec<String>>,
}

impl StubEngineFactory {
    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            instances: AtomicUsize::new(0),
            last_args: Mutex::new(Vec::new()),
        }
    }

    /// How many instances have been built.
    pub fn instances(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent instance.
    pub fn last_args(&self) -> Vec<String> {
        self.last_args.lock().unwrap().clone()
    }
}

impl EngineFactory for StubEngineFactory {
    fn instantiate(
        &self,
        args: Vec<String>,
        host: EngineHost,
    ) -> EngineResult<Box<dyn VerificationEngine>> {
        self.instances.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().unwrap() = args.clone();
        Ok(Box::new(StubEngine {
            behavior: self.behavior,
            args,
            host,
            session: None,
        }))
    }
}

pub struct StubEngine {
    behavior: StubBehavior,
    args: Vec<String>,
    host: EngineHost,
    session: Option<String>,
}

impl StubEngine {
    fn load_prelude(&self) -> EngineResult<()> {
        let index: Value = serde_json::from_slice(&self.host.index())
            .map_err(|e| EngineError::MalformedOutput(e.to_string()))?;
        let names: Vec<String> = index["files"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(|name| format!("{}{}", self.host.root(), name))
            .collect();
        for name in names {
            self.host.read_file(&name)?;
        }
        Ok(())
    }

    fn source(&self, fname: &str) -> EngineResult<Option<String>> {
        Ok(self
            .host
            .read_file(fname)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn verify(&mut self) -> EngineResult<i32> {
        let fname = self
            .args
            .last()
            .cloned()
            .ok_or_else(|| EngineError::Fault("no input file".to_string()))?;
        self.load_prelude()?;

        let Some(source) = self.source(&fname)? else {
            self.host.stderr(&format!("{}: file not found\n", fname));
            return Ok(1);
        };

        let mut failed = false;
        for line in source.lines().map(str::trim) {
            if line.starts_with('(') {
                let answer = self.host.ask(line)?;
                self.host.stdout(&format!("{} => {}\n", line, answer));
            } else if line == "fail" {
                failed = true;
            }
        }

        if failed {
            self.host.stderr(&format!("{}: verification failed\n", fname));
            Ok(1)
        } else {
            self.host.stdout(&format!("Verified module: {}\n", fname));
            Ok(0)
        }
    }
}

impl VerificationEngine for StubEngine {
    fn host_mut(&mut self) -> &mut EngineHost {
        &mut self.host
    }

    fn run_main(&mut self) -> EngineResult<i32> {
        match self.behavior {
            StubBehavior::Verify => self.verify(),
            StubBehavior::Fault => {
                self.host.stdout("partial output\n");
                Err(EngineError::Fault("unreachable executed".to_string()))
            }
            StubBehavior::Panic => {
                self.host.stdout("partial output\n");
                panic!("engine bug");
            }
        }
    }

    fn ide_init(&mut self, fname: &str) -> EngineResult<()> {
        if self.source(fname)?.is_none() {
            return Err(EngineError::Fault(format!("{}: file not found", fname)));
        }
        self.session = Some(fname.to_string());
        self.host
            .message(&json!({"kind": "protocol-info", "version": 2}).to_string());
        Ok(())
    }

    /// Answers every query with the current line count of the session file.
    fn ide_eval(&mut self, query: &str) -> EngineResult<String> {
        let fname = self
            .session
            .clone()
            .ok_or_else(|| EngineError::Fault("session not initialized".to_string()))?;
        let query: Value =
            serde_json::from_str(query).map_err(|e| EngineError::MalformedOutput(e.to_string()))?;
        let lines = self.source(&fname)?.map_or(0, |s| s.lines().count());

        self.host.message(
            &json!({"kind": "message", "level": "progress", "contents": {"stage": "started"}})
                .to_string(),
        );
        Ok(json!({
            "kind": "response",
            "query-id": query["query-id"],
            "status": "success",
            "response": {"lines": lines},
        })
        .to_string())
    }
}

/// Hands out a stub factory after an optional delay.
pub struct StubLoader {
    factory: Option<Arc<StubEngineFactory>>,
    delay: Duration,
}

impl StubLoader {
    pub fn new(factory: Arc<StubEngineFactory>, delay: Duration) -> Self {
        Self {
            factory: Some(factory),
            delay,
        }
    }

    /// A loader whose engine never loads.
    pub fn failing() -> Self {
        Self {
            factory: None,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl EngineLoader for StubLoader {
    async fn load(&self) -> EngineResult<Arc<dyn EngineFactory>> {
        tokio::time::sleep(self.delay).await;
        match &self.factory {
            Some(factory) => Ok(Arc::clone(factory) as Arc<dyn EngineFactory>),
            None => Err(EngineError::Load("engine module is corrupt".to_string())),
        }
    }
}
