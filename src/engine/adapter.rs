// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::capture::LineBuffer;
use super::host::{EngineEvent, EngineHost};
use crate::config::consts::FAULT_EXIT_CODE;
use crate::context::WorkerContext;
use crate::errors::{EngineError, EngineResult, FaultPolicy};
use crate::observability::messages::engine::InstanceCreated;
use crate::observability::messages::worker::FaultCaught;
use crate::observability::messages::StructuredLog;
use crate::protocol::CompletionResult;
use crate::traits::{EngineFactory, VerificationEngine};

/// Per-call knobs for a one-shot run.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    pub fault_policy: FaultPolicy,
}

/// Outcome of a one-shot run: the result plus everything the engine emitted,
/// in order.
#[derive(Debug, Clone)]
pub struct Verification {
    pub result: CompletionResult,
    pub events: Vec<EngineEvent>,
}

/// A one-shot run that failed under [`FaultPolicy::Propagate`], with
/// everything the engine emitted before the failure.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct VerifyFault {
    #[source]
    pub error: EngineError,
    pub events: Vec<EngineEvent>,
}

/// Builds and runs engine instances against the worker's shared resources.
pub struct EngineAdapter {
    factory: Arc<dyn EngineFactory>,
    context: WorkerContext,
}

impl EngineAdapter {
    pub fn new(factory: Arc<dyn EngineFactory>, context: WorkerContext) -> Self {
        Self { factory, context }
    }

    pub fn context(&self) -> &WorkerContext {
        &self.context
    }

    /// Build one instance with `args`, optionally seeing `contents` at `path`.
    pub fn fresh_instance(
        &self,
        args: Vec<String>,
        file_override: Option<(&str, &str)>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> EngineResult<Box<dyn VerificationEngine>> {
        let mut host = EngineHost::new(self.context.clone(), events);
        if let Some((path, contents)) = file_override {
            host.write_file(path, contents.as_bytes());
        }
        InstanceCreated {
            args: &args,
            overridden: file_override.map(|(path, _)| path),
        }
        .log();
        self.factory.instantiate(args, host)
    }

    /// Verify `fname` on a fresh instance with a clean solver context.
    ///
    /// `fname` is appended to `args`. Under [`FaultPolicy::Catch`] this never
    /// fails: faults and panics become a result with [`FAULT_EXIT_CODE`] and
    /// whatever output was produced before the fault. Under
    /// [`FaultPolicy::Propagate`] that output travels with the error.
    pub fn verify(
        &self,
        fname: &str,
        contents: Option<&str>,
        args: &[String],
        options: VerifyOptions,
    ) -> Result<Verification, VerifyFault> {
        let mut args = args.to_vec();
        args.push(fname.to_string());

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let run = || -> EngineResult<i32> {
            self.context.solver.refresh()?;
            let mut engine = self.fresh_instance(args, contents.map(|c| (fname, c)), sender)?;
            engine.run_main()
        };
        let outcome = match options.fault_policy {
            FaultPolicy::Catch => panic::catch_unwind(AssertUnwindSafe(run))
                .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload.as_ref())))),
            FaultPolicy::Propagate => run(),
        };

        // the instance and its sender are gone, so everything it sent is queued
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }

        let exit_code = match outcome {
            Ok(code) => code,
            Err(error) if options.fault_policy == FaultPolicy::Catch => {
                FaultCaught {
                    fname,
                    error: &error,
                }
                .log();
                FAULT_EXIT_CODE
            }
            Err(error) => return Err(VerifyFault { error, events }),
        };

        Ok(Verification {
            result: completion(exit_code, &events),
            events,
        })
    }
}

fn completion(exit_code: i32, events: &[EngineEvent]) -> CompletionResult {
    let mut stdout = LineBuffer::new();
    let mut stderr = LineBuffer::new();
    for event in events {
        match event {
            EngineEvent::Stdout(chunk) => stdout.push(chunk),
            EngineEvent::Stderr(chunk) => stderr.push(chunk),
            EngineEvent::Progress(_) | EngineEvent::Message(_) => {}
        }
    }
    CompletionResult {
        exit_code,
        stdout: stdout.finish(),
        stderr: stderr.finish(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_splits_streams_into_lines() {
        let events = vec![
            EngineEvent::Stdout("Verified ".into()),
            EngineEvent::Progress(Some("Fetching Prims.fst…".into())),
            EngineEvent::Stderr("warning\n".into()),
            EngineEvent::Stdout("module: A\ndone".into()),
            EngineEvent::Progress(None),
        ];

        let result = completion(0, &events);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, vec!["Verified module: A", "done"]);
        assert_eq!(result.stderr, vec!["warning"]);
    }

    #[test]
    fn test_panic_message_from_str_and_string() {
        let from_str = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(from_str.as_ref()), "boom");

        let from_string = panic::catch_unwind(|| panic!("{} failed", "check")).unwrap_err();
        assert_eq!(panic_message(from_string.as_ref()), "check failed");
    }
}
