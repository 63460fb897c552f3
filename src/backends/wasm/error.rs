// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the WebAssembly engine backend.

use thiserror::Error;

use crate::errors::EngineError;

#[derive(Error, Debug)]
pub enum WasmError {
    /// File I/O error during module loading.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Module larger than the configured limit.
    #[error("Engine module too large: {size} bytes (max: {max} bytes)")]
    ModuleTooLarge { size: usize, max: usize },

    /// Module compilation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// A required export is absent or of the wrong kind.
    #[error("Engine module must export '{0}'")]
    MissingExport(&'static str),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),
}

pub type WasmResult<T> = Result<T, WasmError>;

impl From<WasmError> for EngineError {
    fn from(error: WasmError) -> Self {
        match error {
            WasmError::MissingExport(name) => EngineError::MissingExport(name),
            other => EngineError::Load(other.to_string()),
        }
    }
}
