// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use super::bootstrap::{Bootstrap, BootstrapEvent, BootstrapStep};
use super::gate::{Dispatch, RequestQueue};
use crate::engine::EngineAdapter;
use crate::errors::{BootstrapError, FaultPolicy, WorkerError, WorkerResult};
use crate::observability::messages::worker::HostClosed;
use crate::observability::messages::StructuredLog;
use crate::protocol::{HostReader, HostWriter};

/// The worker loop: bootstrap events and host requests in, protocol
/// messages out.
pub struct Worker {
    events: mpsc::UnboundedReceiver<BootstrapEvent>,
    fault_policy: FaultPolicy,
}

impl Worker {
    pub fn new(events: mpsc::UnboundedReceiver<BootstrapEvent>, fault_policy: FaultPolicy) -> Self {
        Self {
            events,
            fault_policy,
        }
    }

    /// Serve the host until it closes `input`.
    ///
    /// Returns an error if bootstrap fails, if a fault is propagated, or if
    /// the host channel breaks. Everything produced before the error has
    /// already been written to `output`.
    pub async fn run<R, W>(self, input: R, output: W) -> WorkerResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Worker {
            mut events,
            fault_policy,
        } = self;
        let mut reader = HostReader::new(input);
        let mut writer = HostWriter::new(output);
        let mut queue = RequestQueue::<EngineAdapter>::new(fault_policy);
        let mut bootstrap = Bootstrap::default();
        let mut host_open = true;

        while !queue.is_ready() {
            tokio::select! {
                event = events.recv() => {
                    let step = match event {
                        Some(event) => bootstrap.apply(event),
                        None => BootstrapStep::Failed(BootstrapError::Incomplete),
                    };
                    match step {
                        BootstrapStep::Pending => {}
                        BootstrapStep::Progress(message) => queue.progress(message),
                        BootstrapStep::Ready(adapter) => {
                            let drained = queue.open(adapter);
                            flush(&mut writer, &mut queue).await?;
                            drained?;
                        }
                        BootstrapStep::Failed(error) => {
                            queue.fail(&error);
                            flush(&mut writer, &mut queue).await?;
                            return Err(WorkerError::Bootstrap(error));
                        }
                    }
                }
                request = reader.next_request(), if host_open => {
                    match request? {
                        Some(request) => queue.submit(request)?,
                        None => {
                            HostClosed { pending: queue.pending(), ready: false }.log();
                            host_open = false;
                        }
                    }
                }
            }
            flush(&mut writer, &mut queue).await?;
        }

        if !host_open {
            return Ok(());
        }

        while let Some(request) = reader.next_request().await? {
            let outcome = queue.submit(request);
            flush(&mut writer, &mut queue).await?;
            outcome?;
        }
        HostClosed {
            pending: 0,
            ready: true,
        }
        .log();
        Ok(())
    }
}

async fn flush<W, D>(writer: &mut HostWriter<W>, queue: &mut RequestQueue<D>) -> WorkerResult<()>
where
    W: AsyncWrite + Unpin,
    D: Dispatch,
{
    for message in queue.take_outbox() {
        writer.send(&message).await?;
    }
    Ok(())
}
