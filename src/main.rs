// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use verification_worker::config::{load_and_validate_config, Config, RuntimeBuilder};

/// Serve verification requests over stdin/stdout.
///
/// Usage: `verification-worker [config.yaml]`. Without a config file every
/// setting takes its default. Logs go to stderr; `RUST_LOG` overrides the
/// default `info` level.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => load_and_validate_config(&path)
            .with_context(|| format!("loading worker configuration from {}", path))?,
        None => Config::default(),
    };

    let worker = RuntimeBuilder::from_config(&config).context("starting worker")?;
    worker
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await
        .context("worker stopped")?;
    Ok(())
}
