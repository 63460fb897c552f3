// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Solver binary started when the configuration names none.
pub const DEFAULT_SOLVER_COMMAND: &str = "z3";
/// Arguments that put the solver into SMT-LIB2 mode reading from stdin.
pub const DEFAULT_SOLVER_ARGS: [&str; 2] = ["-in", "-smt2"];
/// Query sent once to prove the solver is alive.
pub const DEFAULT_SANITY_QUERY: &str = "(check-sat)";
/// Expected answer to [`DEFAULT_SANITY_QUERY`] on an empty context.
pub const DEFAULT_SANITY_ANSWER: &str = "sat";

/// Solver options fixed at start-up, passed as `key=value` parameters.
pub const DEFAULT_SOLVER_OPTIONS: [(&str, &str); 6] = [
    ("model", "true"),
    ("auto_config", "false"),
    ("smt.random_seed", "0"),
    ("smt.case_split", "3"),
    ("smt.relevancy", "2"),
    ("smt.mbqi", "false"),
];

/// Where engine-visible library files live.
pub const DEFAULT_FS_ROOT: &str = "/fstar/";
/// Directory files are fetched from when the configuration names none.
pub const DEFAULT_FS_ORIGIN: &str = "lib";
/// Dependency index, relative to the origin. Must be valid JSON.
pub const INDEX_FILE: &str = "index.json";
/// Dependency cache, relative to the origin. Opaque.
pub const DEPCACHE_FILE: &str = "depcache";

/// Engine module loaded when the configuration names none.
pub const DEFAULT_ENGINE_MODULE: &str = "engine/verifier.wasm";
/// Largest engine module accepted (256 MiB).
pub const MAX_ENGINE_MODULE_SIZE: usize = 256 * 1024 * 1024;
/// Minimum allowed fuel limit (1 million instructions).
pub const MIN_FUEL_LIMIT: u64 = 1_000_000;

/// Exit code reported for a run that faulted under the catch policy.
pub const FAULT_EXIT_CODE: i32 = -1;
/// Argument that switches the engine into interactive mode.
pub const IDE_FLAG: &str = "--ide";

/// Longest host line accepted (64 MiB); file contents travel inline.
pub const MAX_HOST_LINE_BYTES: usize = 64 * 1024 * 1024;
