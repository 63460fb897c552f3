// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::mem;
use std::time::Instant;

use crate::engine::{EngineAdapter, EngineEvent, Verification, VerifyFault, VerifyOptions};
use crate::errors::{BootstrapError, FaultPolicy, WorkerError, WorkerResult};
use crate::observability::messages::worker::{
    BootstrapFailed, BootstrapProgress, RequestBuffered, VerificationFinished, VerificationStarted,
    WorkerReady,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{VerifyRequest, WorkerMessage};

/// Runs one request to completion.
pub trait Dispatch {
    fn dispatch(&self, request: &VerifyRequest, options: VerifyOptions) -> Result<Verification, VerifyFault>;
}

impl Dispatch for EngineAdapter {
    fn dispatch(&self, request: &VerifyRequest, options: VerifyOptions) -> Result<Verification, VerifyFault> {
        self.verify(
            &request.fname,
            request.fcontents.as_deref(),
            &request.args,
            options,
        )
    }
}

enum GateState<D> {
    Booting { buffer: VecDeque<VerifyRequest> },
    Ready(D),
}

/// The readiness gate.
///
/// Buffers requests until [`RequestQueue::open`], then runs them one at a
/// time. Everything meant for the host is collected in an outbox, in the
/// order it must be sent; the caller drains it with
/// [`RequestQueue::take_outbox`] after every step.
pub struct RequestQueue<D: Dispatch> {
    state: GateState<D>,
    options: VerifyOptions,
    outbox: Vec<WorkerMessage>,
    created: Instant,
}

impl<D: Dispatch> RequestQueue<D> {
    pub fn new(fault_policy: FaultPolicy) -> Self {
        Self {
            state: GateState::Booting {
                buffer: VecDeque::new(),
            },
            options: VerifyOptions { fault_policy },
            outbox: Vec::new(),
            created: Instant::now(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GateState::Ready(_))
    }

    /// Requests waiting for the gate to open.
    pub fn pending(&self) -> usize {
        match &self.state {
            GateState::Booting { buffer } => buffer.len(),
            GateState::Ready(_) => 0,
        }
    }

    /// Buffer `request` while booting, run it right away once ready.
    pub fn submit(&mut self, request: VerifyRequest) -> WorkerResult<()> {
        match &mut self.state {
            GateState::Booting { buffer } => {
                buffer.push_back(request);
                RequestBuffered {
                    fname: &buffer[buffer.len() - 1].fname,
                    queued: buffer.len(),
                }
                .log();
                Ok(())
            }
            GateState::Ready(dispatcher) => {
                run(dispatcher, &request, self.options, &mut self.outbox)
            }
        }
    }

    /// Open the gate: emit READY and drain the buffer in arrival order.
    ///
    /// Opening an open gate does nothing. On a propagated fault the requests
    /// after the failing one are left unrun.
    pub fn open(&mut self, dispatcher: D) -> WorkerResult<()> {
        let buffered = match mem::replace(&mut self.state, GateState::Ready(dispatcher)) {
            GateState::Booting { buffer } => buffer,
            ready @ GateState::Ready(_) => {
                self.state = ready;
                return Ok(());
            }
        };

        WorkerReady {
            buffered: buffered.len(),
            elapsed: self.created.elapsed(),
        }
        .log();
        self.outbox.push(WorkerMessage::Ready);

        if let GateState::Ready(dispatcher) = &self.state {
            for request in &buffered {
                run(dispatcher, request, self.options, &mut self.outbox)?;
            }
        }
        Ok(())
    }

    /// Bootstrap failed: tell the host and drop everything buffered.
    ///
    /// Returns how many requests were dropped.
    pub fn fail(&mut self, error: &BootstrapError) -> usize {
        let dropped = match &mut self.state {
            GateState::Booting { buffer } => mem::take(buffer).len(),
            GateState::Ready(_) => 0,
        };
        BootstrapFailed { error, dropped }.log();
        self.outbox
            .push(WorkerMessage::BootstrapFailed(error.to_string()));
        dropped
    }

    /// Forward a bootstrap status line to the host.
    pub fn progress(&mut self, message: String) {
        BootstrapProgress { message: &message }.log();
        self.outbox.push(WorkerMessage::Progress(Some(message)));
    }

    /// Messages produced since the last call, oldest first.
    pub fn take_outbox(&mut self) -> Vec<WorkerMessage> {
        mem::take(&mut self.outbox)
    }
}

fn run<D: Dispatch>(
    dispatcher: &D,
    request: &VerifyRequest,
    options: VerifyOptions,
    outbox: &mut Vec<WorkerMessage>,
) -> WorkerResult<()> {
    let started = VerificationStarted {
        fname: &request.fname,
        args: &request.args,
    };
    let span = started.span("dispatch");
    let _guard = span.enter();
    started.log();
    let clock = Instant::now();

    let verification = match dispatcher.dispatch(request, options) {
        Ok(verification) => verification,
        Err(fault) => {
            // the host still sees what was written before the fault
            outbox.extend(fault.events.into_iter().filter_map(transcript_message));
            return Err(WorkerError::Fault {
                fname: request.fname.clone(),
                source: fault.error,
            });
        }
    };

    outbox.extend(verification.events.into_iter().filter_map(transcript_message));
    VerificationFinished {
        fname: &request.fname,
        exit_code: verification.result.exit_code,
        duration: clock.elapsed(),
    }
    .log();
    outbox.push(WorkerMessage::VerificationComplete(verification.result));
    Ok(())
}

/// The host-visible form of an engine event. Interactive messages only
/// matter to sessions and are not forwarded.
fn transcript_message(event: EngineEvent) -> Option<WorkerMessage> {
    match event {
        EngineEvent::Stdout(chunk) => Some(WorkerMessage::Stdout(chunk)),
        EngineEvent::Stderr(chunk) => Some(WorkerMessage::Stderr(chunk)),
        EngineEvent::Progress(status) => Some(WorkerMessage::Progress(status)),
        EngineEvent::Message(_) => None,
    }
}
