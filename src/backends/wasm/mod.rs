// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hosts a compiled engine as a WebAssembly core module.
//!
//! # Guest contract
//!
//! Required exports:
//! * `memory`
//! * `allocate(size: i32) -> i32` and `deallocate(ptr: i32, size: i32)`
//! * `verifier_main(ptr: i32, len: i32) -> i32` - arguments as NUL-separated
//!   UTF-8, returns the exit code
//!
//! Optional exports, needed for sessions:
//! * `verifier_ide_init(ptr: i32, len: i32) -> i32` - file name, 0 on success
//! * `verifier_ide_eval(ptr: i32, len: i32) -> i64` - query in, packed response out
//!
//! Host imports live in module `verifier_host`; see [`host_abi`]. Byte
//! results travel as `(ptr << 32) | len` in guest memory allocated through the
//! guest's own `allocate`, or `-1` when absent.

mod error;
pub mod host_abi;
mod instance;
mod loader;

pub use error::{WasmError, WasmResult};
pub use instance::{WasmEngine, WasmEngineFactory};
pub use loader::{load_engine_bytes, WasmEngineLoader};
