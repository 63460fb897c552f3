// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine backends.
//!
//! A backend turns a compiled engine into an [`EngineFactory`](crate::traits::EngineFactory)
//! that the worker instantiates once per request.
//!
//! ## WASM Backend
//! The production engine: a WebAssembly core module run under wasmtime, with
//! solver, filesystem and output access provided through host imports.
//!
//! ## Stub Backend (Test-Only)
//! Scriptable in-process engines for exercising the adapter and worker
//! without compiling a module. Not available in production builds.

#[cfg(test)]
pub mod stub;
pub mod wasm;
