// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::FilesystemConfig;
use crate::context::WorkerContext;
use crate::engine::EngineAdapter;
use crate::errors::BootstrapError;
use crate::filesystem::{DirectoryOrigin, SharedFilesystem};
use crate::solver::{SolverBridge, SolverInit, SolverInitEvent};
use crate::traits::{EngineFactory, EngineLoader};

/// Something one of the bootstrap tasks finished or wants the host to see.
pub enum BootstrapEvent {
    Progress(String),
    FilesystemMounted(Arc<SharedFilesystem>),
    EngineLoaded(Arc<dyn EngineFactory>),
    SolverReady(Arc<SolverBridge>),
    Failed(BootstrapError),
}

/// Start loading the engine, provisioning the solver and mounting the
/// filesystem, all in the background.
///
/// Returns at once. Each task reports over the returned channel, which
/// closes when all of them are done.
pub fn start(
    loader: Arc<dyn EngineLoader>,
    solver: SolverInit,
    filesystem: FilesystemConfig,
) -> mpsc::UnboundedReceiver<BootstrapEvent> {
    let (sender, events) = mpsc::unbounded_channel();

    let engine = sender.clone();
    tokio::spawn(async move {
        let _ = engine.send(BootstrapEvent::Progress(
            "Loading verification engine…".to_string(),
        ));
        let event = match loader.load().await {
            Ok(factory) => BootstrapEvent::EngineLoaded(factory),
            Err(error) => BootstrapEvent::Failed(BootstrapError::Engine(error)),
        };
        let _ = engine.send(event);
    });

    let provisioning = sender.clone();
    tokio::spawn(async move {
        let mut solver = solver;
        while let Some(event) = solver.next().await {
            let event = match event {
                SolverInitEvent::Progress(message) => BootstrapEvent::Progress(message),
                SolverInitEvent::Ready(bridge) => BootstrapEvent::SolverReady(Arc::new(bridge)),
                SolverInitEvent::Failed(error) => {
                    BootstrapEvent::Failed(BootstrapError::Solver(error))
                }
            };
            if provisioning.send(event).is_err() {
                break;
            }
        }
    });

    tokio::task::spawn_blocking(move || {
        let _ = sender.send(BootstrapEvent::Progress(format!(
            "Mounting {}…",
            filesystem.origin.display()
        )));
        let origin = DirectoryOrigin::new(filesystem.origin.clone());
        let event = match SharedFilesystem::open(origin, filesystem.root.clone()) {
            Ok(mounted) => BootstrapEvent::FilesystemMounted(Arc::new(mounted)),
            Err(error) => BootstrapEvent::Failed(BootstrapError::Filesystem(error.to_string())),
        };
        let _ = sender.send(event);
    });

    events
}

/// What applying one bootstrap event means for the worker.
pub enum BootstrapStep {
    /// Still waiting on other resources.
    Pending,
    Progress(String),
    /// Everything is up; the adapter is wired to all of it.
    Ready(EngineAdapter),
    Failed(BootstrapError),
}

/// Collects bootstrap results until the engine, solver and filesystem are
/// all available.
#[derive(Default)]
pub struct Bootstrap {
    filesystem: Option<Arc<SharedFilesystem>>,
    factory: Option<Arc<dyn EngineFactory>>,
    solver: Option<Arc<SolverBridge>>,
}

impl Bootstrap {
    pub fn apply(&mut self, event: BootstrapEvent) -> BootstrapStep {
        match event {
            BootstrapEvent::Progress(message) => return BootstrapStep::Progress(message),
            BootstrapEvent::Failed(error) => return BootstrapStep::Failed(error),
            BootstrapEvent::FilesystemMounted(filesystem) => self.filesystem = Some(filesystem),
            BootstrapEvent::EngineLoaded(factory) => self.factory = Some(factory),
            BootstrapEvent::SolverReady(solver) => self.solver = Some(solver),
        }

        if self.filesystem.is_none() || self.factory.is_none() || self.solver.is_none() {
            return BootstrapStep::Pending;
        }
        match (self.filesystem.take(), self.factory.take(), self.solver.take()) {
            (Some(filesystem), Some(factory), Some(solver)) => BootstrapStep::Ready(
                EngineAdapter::new(factory, WorkerContext::new(filesystem, solver)),
            ),
            _ => BootstrapStep::Pending,
        }
    }
}
