// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::EngineHost;
use crate::errors::EngineResult;

/// One constructed engine, bound to its arguments and its host.
///
/// An instance may keep arbitrary internal state between calls; nothing
/// about it is shared with other instances except what the host shares.
pub trait VerificationEngine: Send {
    fn host_mut(&mut self) -> &mut EngineHost;

    /// Run the command-line entry point to completion and return its exit code.
    fn run_main(&mut self) -> EngineResult<i32>;

    /// Start interactive mode on `fname`.
    fn ide_init(&mut self, fname: &str) -> EngineResult<()>;

    /// Evaluate one interactive query (JSON text) and return the response.
    fn ide_eval(&mut self, query: &str) -> EngineResult<String>;
}

/// Builds fresh engine instances from an already loaded engine binary.
pub trait EngineFactory: Send + Sync {
    fn instantiate(
        &self,
        args: Vec<String>,
        host: EngineHost,
    ) -> EngineResult<Box<dyn VerificationEngine>>;
}

/// Loads the engine binary; the asynchronous half of worker bootstrap.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self) -> EngineResult<Arc<dyn EngineFactory>>;
}
