// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // engine backends (wasm, test stubs)
pub mod config;        // config + runtime builder
pub mod context;       // shared worker resources
pub mod engine;        // engine adapter, host and sessions
pub mod errors;        // error handling
pub mod filesystem;    // lazy shared filesystem
pub mod observability;
pub mod protocol;      // host <-> worker messages and framing
pub mod solver;        // solver subprocess bridge
pub mod traits;        // engine abstractions
pub mod worker;        // readiness gate and stdio loop
