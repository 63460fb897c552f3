// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reading, compiling and validating the engine module.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use wasmtime::{Config, Engine, ExternType, Module};

use super::error::{WasmError, WasmResult};
use super::instance::WasmEngineFactory;
use crate::config::consts::MAX_ENGINE_MODULE_SIZE;
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::observability::messages::engine::{ModuleCompiled, ModuleLoadFailed, ModuleLoaded};
use crate::observability::messages::StructuredLog;
use crate::traits::{EngineFactory, EngineLoader};

/// Exports every engine module must provide, and whether each is a memory.
const REQUIRED_EXPORTS: [(&str, bool); 4] = [
    ("memory", true),
    ("allocate", false),
    ("deallocate", false),
    ("verifier_main", false),
];

/// Read the engine module at `path`, refusing anything over the size limit.
pub fn load_engine_bytes<P: AsRef<Path>>(path: P) -> WasmResult<Vec<u8>> {
    load_with_limit(path.as_ref(), MAX_ENGINE_MODULE_SIZE)
}

fn load_with_limit(path: &Path, max: usize) -> WasmResult<Vec<u8>> {
    let module_path = path.display().to_string();
    let fail = |error: WasmError| {
        ModuleLoadFailed {
            module_path: &module_path,
            error: &error,
        }
        .log();
        error
    };

    let bytes = std::fs::read(path).map_err(|e| fail(WasmError::IoError(e)))?;
    if bytes.len() > max {
        return Err(fail(WasmError::ModuleTooLarge {
            size: bytes.len(),
            max,
        }));
    }

    ModuleLoaded {
        module_path: &module_path,
        size_bytes: bytes.len(),
    }
    .log();
    Ok(bytes)
}

/// A wasmtime engine for the verifier: single memory, no threads, fuel when
/// a limit is configured.
pub(crate) fn create_engine(consume_fuel: bool) -> WasmResult<Engine> {
    let mut config = Config::new();
    config.wasm_threads(false);
    config.wasm_multi_memory(false);
    config.wasm_memory64(false);
    config.consume_fuel(consume_fuel);
    config.epoch_interruption(false);

    Engine::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
}

pub(crate) fn compile_module(engine: &Engine, bytes: &[u8]) -> WasmResult<Module> {
    let module = Module::new(engine, bytes).map_err(|e| WasmError::ModuleError(format!("{:#}", e)))?;
    validate_exports(&module)?;
    Ok(module)
}

fn validate_exports(module: &Module) -> WasmResult<()> {
    for (name, is_memory) in REQUIRED_EXPORTS {
        let found = match module.get_export(name) {
            Some(ExternType::Memory(_)) => is_memory,
            Some(ExternType::Func(_)) => !is_memory,
            _ => false,
        };
        if !found {
            return Err(WasmError::MissingExport(name));
        }
    }
    Ok(())
}

/// Loads the configured engine module off the async runtime.
pub struct WasmEngineLoader {
    module: PathBuf,
    fuel_limit: Option<u64>,
}

impl WasmEngineLoader {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            module: config.module.clone(),
            fuel_limit: config.fuel_limit,
        }
    }
}

#[async_trait]
impl EngineLoader for WasmEngineLoader {
    async fn load(&self) -> EngineResult<Arc<dyn EngineFactory>> {
        let module = self.module.clone();
        let fuel_limit = self.fuel_limit;

        let factory = tokio::task::spawn_blocking(move || -> WasmResult<WasmEngineFactory> {
            let started = Instant::now();
            let bytes = load_engine_bytes(&module)?;
            let factory = WasmEngineFactory::from_bytes(&bytes, fuel_limit)?;
            ModuleCompiled {
                module_path: &module.display().to_string(),
                duration: started.elapsed(),
            }
            .log();
            Ok(factory)
        })
        .await
        .map_err(|e| EngineError::Load(format!("engine compilation task failed: {}", e)))??;

        Ok(Arc::new(factory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_ENGINE: &str = r#"
      (module
        (memory (export "memory") 1)
        (func (export "allocate") (param i32) (result i32) (i32.const 1024))
        (func (export "deallocate") (param i32 i32))
        (func (export "verifier_main") (param i32 i32) (result i32) (i32.const 0)))
    "#;

    fn module_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_load_small_file() {
        let file = module_file(b"engine bytes");
        assert_eq!(load_engine_bytes(file.path()).unwrap(), b"engine bytes");
    }

    #[test]
    fn test_file_over_limit_is_refused() {
        let file = module_file(&[0u8; 65]);

        let err = load_with_limit(file.path(), 64).unwrap_err();
        assert!(matches!(err, WasmError::ModuleTooLarge { size: 65, max: 64 }));
        assert!(load_with_limit(file.path(), 65).is_ok());
    }

    #[test]
    fn test_nonexistent_file() {
        let err = load_engine_bytes("/nonexistent/engine.wasm").unwrap_err();
        assert!(matches!(err, WasmError::IoError(_)));
    }

    #[test]
    fn test_compile_accepts_minimal_engine() {
        let engine = create_engine(false).unwrap();
        let bytes = wat::parse_str(MINIMAL_ENGINE).unwrap();
        assert!(compile_module(&engine, &bytes).is_ok());
    }

    #[test]
    fn test_compile_rejects_missing_entry_point() {
        let engine = create_engine(false).unwrap();
        let bytes = wat::parse_str(
            r#"(module
                 (memory (export "memory") 1)
                 (func (export "allocate") (param i32) (result i32) (i32.const 0))
                 (func (export "deallocate") (param i32 i32)))"#,
        )
        .unwrap();

        let err = compile_module(&engine, &bytes).unwrap_err();
        assert!(matches!(err, WasmError::MissingExport("verifier_main")));
    }

    #[test]
    fn test_compile_rejects_memory_exported_as_function() {
        let engine = create_engine(false).unwrap();
        let bytes = wat::parse_str(
            r#"(module
                 (func (export "memory"))
                 (func (export "allocate") (param i32) (result i32) (i32.const 0))
                 (func (export "deallocate") (param i32 i32))
                 (func (export "verifier_main") (param i32 i32) (result i32) (i32.const 0)))"#,
        )
        .unwrap();

        let err = compile_module(&engine, &bytes).unwrap_err();
        assert!(matches!(err, WasmError::MissingExport("memory")));
    }

    #[test]
    fn test_compile_rejects_garbage() {
        let engine = create_engine(false).unwrap();
        let err = compile_module(&engine, b"not wasm").unwrap_err();
        assert!(matches!(err, WasmError::ModuleError(_)));
    }

    #[tokio::test]
    async fn test_loader_compiles_configured_module() {
        let file = module_file(&wat::parse_str(MINIMAL_ENGINE).unwrap());
        let loader = WasmEngineLoader::new(&EngineConfig {
            module: file.path().to_path_buf(),
            fuel_limit: Some(10_000_000),
        });

        assert!(loader.load().await.is_ok());
    }

    #[tokio::test]
    async fn test_loader_reports_missing_module() {
        let loader = WasmEngineLoader::new(&EngineConfig {
            module: PathBuf::from("/nonexistent/engine.wasm"),
            fuel_limit: None,
        });

        let err = loader.load().await.err().unwrap();
        assert!(matches!(err, EngineError::Load(_)));
    }
}
