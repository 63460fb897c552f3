// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::filesystem::SharedFilesystem;
use crate::solver::SolverBridge;

/// Resources every engine instance in this worker shares.
///
/// Built once, after bootstrap, and handed to the engine adapter.
#[derive(Clone)]
pub struct WorkerContext {
    pub filesystem: Arc<SharedFilesystem>,
    pub solver: Arc<SolverBridge>,
}

impl WorkerContext {
    pub fn new(filesystem: Arc<SharedFilesystem>, solver: Arc<SolverBridge>) -> Self {
        Self { filesystem, solver }
    }
}
