// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;
mod solver;
mod worker;

pub use config::{ConfigError, ConfigResult};
pub use engine::{EngineError, EngineResult, FaultPolicy, ResolverError};
pub use solver::{SolverError, SolverResult};
pub use worker::{BootstrapError, WorkerError, WorkerResult};
