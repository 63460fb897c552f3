// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::wasm::WasmEngineLoader;
use crate::config::Config;
use crate::errors::ConfigResult;
use crate::solver::SolverBridge;
use crate::worker::{self, Worker};

/// Worker runtime builder - starts bootstrap and wires the worker loop from
/// configuration.
///
/// # Examples
///
/// ```no_run
/// use verification_worker::config::{load_and_validate_config, RuntimeBuilder};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_and_validate_config("configs/worker.yaml")?;
/// let worker = RuntimeBuilder::from_config(&config)?;
/// worker.run(tokio::io::stdin(), tokio::io::stdout()).await?;
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Validate `cfg`, start loading the engine, provisioning the solver and
    /// mounting the filesystem, and return the worker that will serve
    /// requests once they are up.
    ///
    /// Must be called from within a tokio runtime. Returns before any
    /// bootstrap work completes.
    pub fn from_config(cfg: &Config) -> ConfigResult<Worker> {
        cfg.validate()?;
        let loader = Arc::new(WasmEngineLoader::new(&cfg.engine));
        let solver = SolverBridge::init_async(cfg.solver.clone());
        let events = worker::start(loader, solver, cfg.filesystem.clone());
        Ok(Worker::new(events, cfg.worker.fault_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{BootstrapError, ConfigError, WorkerError};
    use crate::protocol::WorkerMessage;

    #[test]
    fn test_invalid_config_is_rejected_before_bootstrap() {
        let mut cfg = Config::default();
        cfg.filesystem.root = "fstar".to_string();

        let err = RuntimeBuilder::from_config(&cfg).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "filesystem.root",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_resources_end_in_bootstrap_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.engine.module = dir.path().join("missing.wasm");
        cfg.solver.command = "verification-worker-no-such-solver".to_string();
        cfg.filesystem.origin = dir.path().to_path_buf();

        let worker = RuntimeBuilder::from_config(&cfg).unwrap();
        let mut output = Vec::new();
        let err = worker.run(&b""[..], &mut output).await.unwrap_err();

        assert!(matches!(err, WorkerError::Bootstrap(BootstrapError::Engine(_))
            | WorkerError::Bootstrap(BootstrapError::Solver(_))
            | WorkerError::Bootstrap(BootstrapError::Filesystem(_))));
        let last = String::from_utf8(output).unwrap().lines().last().map(str::to_string).unwrap();
        assert!(matches!(
            serde_json::from_str::<WorkerMessage>(&last).unwrap(),
            WorkerMessage::BootstrapFailed(_)
        ));
    }
}
