// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use wasmtime::{Engine, Instance, Linker, Module, Store};

use super::error::{WasmError, WasmResult};
use super::host_abi::{self, unpack, GuestMemory};
use super::loader::{compile_module, create_engine};
use crate::engine::EngineHost;
use crate::errors::{EngineError, EngineResult, ResolverError};
use crate::traits::{EngineFactory, VerificationEngine};

const MAIN_EXPORT: &str = "verifier_main";
const IDE_INIT_EXPORT: &str = "verifier_ide_init";
const IDE_EVAL_EXPORT: &str = "verifier_ide_eval";

/// A compiled engine module ready to be instantiated any number of times.
pub struct WasmEngineFactory {
    engine: Engine,
    module: Module,
    linker: Linker<EngineHost>,
    fuel_limit: Option<u64>,
}

impl WasmEngineFactory {
    /// Compile `bytes` and link the host imports.
    pub fn from_bytes(bytes: &[u8], fuel_limit: Option<u64>) -> WasmResult<Self> {
        let engine = create_engine(fuel_limit.is_some())?;
        let module = compile_module(&engine, bytes)?;
        let mut linker = Linker::new(&engine);
        host_abi::add_to_linker(&mut linker).map_err(|e| WasmError::EngineError(e.to_string()))?;
        Ok(Self {
            engine,
            module,
            linker,
            fuel_limit,
        })
    }

    /// Whether the module exports the interactive entry points.
    pub fn supports_sessions(&self) -> bool {
        self.module.get_export(IDE_INIT_EXPORT).is_some()
            && self.module.get_export(IDE_EVAL_EXPORT).is_some()
    }
}

impl EngineFactory for WasmEngineFactory {
    fn instantiate(
        &self,
        args: Vec<String>,
        host: EngineHost,
    ) -> EngineResult<Box<dyn VerificationEngine>> {
        let mut store = Store::new(&self.engine, host);
        if let Some(fuel) = self.fuel_limit {
            store
                .set_fuel(fuel)
                .map_err(|e| EngineError::Instantiate(e.to_string()))?;
        }
        let instance = self
            .linker
            .instantiate(&mut store, &self.module)
            .map_err(|e| EngineError::Instantiate(format!("{:#}", e)))?;
        let guest = GuestMemory::from_instance(&mut store, &instance)?;

        Ok(Box::new(WasmEngine {
            store,
            instance,
            guest,
            args,
        }))
    }
}

/// One live instance of the engine module with its own store.
pub struct WasmEngine {
    store: Store<EngineHost>,
    instance: Instance,
    guest: GuestMemory,
    args: Vec<String>,
}

impl WasmEngine {
    /// Call an `(ptr, len)` export with `input` copied into guest memory.
    fn call_with_bytes<R>(&mut self, export: &'static str, input: &[u8]) -> EngineResult<R>
    where
        R: wasmtime::WasmResults,
    {
        let entry = self
            .instance
            .get_typed_func::<(i32, i32), R>(&mut self.store, export)
            .map_err(|_| EngineError::MissingExport(export))?;
        let (ptr, len) = self.guest.write(&mut self.store, input).map_err(fault)?;
        let result = entry.call(&mut self.store, (ptr, len)).map_err(fault)?;
        self.guest.release(&mut self.store, ptr, len).map_err(fault)?;
        Ok(result)
    }
}

impl VerificationEngine for WasmEngine {
    fn host_mut(&mut self) -> &mut EngineHost {
        self.store.data_mut()
    }

    fn run_main(&mut self) -> EngineResult<i32> {
        let argv = self.args.join("\0");
        self.call_with_bytes::<i32>(MAIN_EXPORT, argv.as_bytes())
    }

    fn ide_init(&mut self, fname: &str) -> EngineResult<()> {
        match self.call_with_bytes::<i32>(IDE_INIT_EXPORT, fname.as_bytes())? {
            0 => Ok(()),
            code => Err(EngineError::Fault(format!(
                "session init for '{}' returned {}",
                fname, code
            ))),
        }
    }

    fn ide_eval(&mut self, query: &str) -> EngineResult<String> {
        let packed = self.call_with_bytes::<i64>(IDE_EVAL_EXPORT, query.as_bytes())?;
        let (ptr, len) = unpack(packed)
            .ok_or_else(|| EngineError::MalformedOutput("engine returned no response".to_string()))?;
        let bytes = self.guest.read(&self.store, ptr, len).map_err(fault)?;
        self.guest.release(&mut self.store, ptr, len).map_err(fault)?;
        String::from_utf8(bytes).map_err(|e| EngineError::MalformedOutput(e.to_string()))
    }
}

/// Classify an error that escaped guest code.
fn fault(error: wasmtime::Error) -> EngineError {
    match error.downcast::<ResolverError>() {
        Ok(resolver) => EngineError::Resolver(resolver),
        Err(error) => EngineError::Fault(format!("{:#}", error)),
    }
}
