// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio::sync::mpsc;

use super::bridge::SolverBridge;
use super::options::solver_arguments;
use super::transport::{ProcessTransport, SolverTransport};
use crate::config::SolverConfig;
use crate::errors::{SolverError, SolverResult};
use crate::observability::messages::solver::{
    SolverProvisioningFailed, SolverReady, SolverSpawned,
};
use crate::observability::messages::StructuredLog;

/// One step of solver provisioning.
pub enum SolverInitEvent {
    Progress(String),
    Ready(SolverBridge),
    Failed(SolverError),
}

impl SolverInitEvent {
    fn is_terminal(&self) -> bool {
        !matches!(self, SolverInitEvent::Progress(_))
    }
}

/// Events from one provisioning attempt.
///
/// Yields any number of `Progress` events and then exactly one `Ready` or
/// `Failed`, after which it is exhausted. It cannot be restarted.
pub struct SolverInit {
    events: mpsc::UnboundedReceiver<SolverInitEvent>,
    finished: bool,
}

impl SolverInit {
    pub async fn next(&mut self) -> Option<SolverInitEvent> {
        if self.finished {
            return None;
        }
        let event = self
            .events
            .recv()
            .await
            .unwrap_or(SolverInitEvent::Failed(SolverError::ProvisioningAborted));
        self.finished = event.is_terminal();
        Some(event)
    }
}

impl SolverBridge {
    /// Start the configured solver process in the background.
    ///
    /// Returns at once; must be called from within a tokio runtime.
    pub fn init_async(config: SolverConfig) -> SolverInit {
        Self::init_with(config, |command, args| {
            let transport = ProcessTransport::spawn(command, args)?;
            Ok(Box::new(transport) as Box<dyn SolverTransport>)
        })
    }

    /// Like [`SolverBridge::init_async`] with a custom way of reaching the solver.
    pub fn init_with<F>(config: SolverConfig, connect: F) -> SolverInit
    where
        F: FnOnce(&str, &[String]) -> SolverResult<Box<dyn SolverTransport>> + Send + 'static,
    {
        let (sender, events) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking(move || {
            let event = match provision(&config, connect, &sender) {
                Ok(bridge) => SolverInitEvent::Ready(bridge),
                Err(error) => {
                    SolverProvisioningFailed {
                        command: &config.command,
                        error: &error,
                    }
                    .log();
                    SolverInitEvent::Failed(error)
                }
            };
            let _ = sender.send(event);
        });

        SolverInit {
            events,
            finished: false,
        }
    }
}

fn provision<F>(
    config: &SolverConfig,
    connect: F,
    progress: &mpsc::UnboundedSender<SolverInitEvent>,
) -> SolverResult<SolverBridge>
where
    F: FnOnce(&str, &[String]) -> SolverResult<Box<dyn SolverTransport>>,
{
    let args = solver_arguments(config);

    let _ = progress.send(SolverInitEvent::Progress(format!(
        "Starting {}…",
        config.command
    )));
    let transport = connect(&config.command, &args)?;
    SolverSpawned {
        command: &config.command,
        args: &args,
    }
    .log();

    let bridge = SolverBridge::new(transport);
    let _ = progress.send(SolverInitEvent::Progress(format!(
        "Checking {}…",
        config.command
    )));
    bridge.sanity_check(&config.sanity_query, &config.expected_answer)?;
    SolverReady {
        command: &config.command,
    }
    .log();

    Ok(bridge)
}
