// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_SOLVER_OPTIONS;
use crate::config::SolverConfig;

/// Full argument list for the solver process.
///
/// Options go on the command line as `key=value` so that `(reset)` between
/// requests cannot drop them. Built-in options keep their order; configured
/// ones replace them by key, and new keys follow in sorted order.
pub fn solver_arguments(config: &SolverConfig) -> Vec<String> {
    let mut arguments = config.args.clone();

    for (key, default) in DEFAULT_SOLVER_OPTIONS {
        let value = config
            .options
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| default.to_string());
        arguments.push(format!("{}={}", key, value));
    }

    arguments.extend(
        config
            .options
            .iter()
            .filter(|(key, _)| !DEFAULT_SOLVER_OPTIONS.iter().any(|(k, _)| k == key))
            .map(|(key, value)| format!("{}={}", key, value)),
    );

    arguments
}
