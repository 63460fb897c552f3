// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host functions imported by the engine, and the byte marshaling they share
//! with instance calls.
//!
//! | import | signature | meaning |
//! |---|---|---|
//! | `solver_ask` | `(ptr, len) -> i64` | query in, response out; `-1` if the solver is gone |
//! | `solver_refresh` | `() -> i32` | `0`, or `-1` if the solver is gone |
//! | `fs_read` | `(ptr, len) -> i64` | path in, contents out; `-1` if absent, traps if a fetch fails |
//! | `fs_index` | `() -> i64` | dependency index |
//! | `fs_depcache` | `() -> i64` | dependency cache |
//! | `channel_write` | `(fd, ptr, len)` | `fd` 1 is stdout, 2 is stderr |
//! | `progress` | `(ptr, len)` | status text |
//! | `progress_clear` | `()` | clear the status |
//! | `ide_message` | `(ptr, len)` | out-of-band interactive message (JSON) |

use wasmtime::{AsContext, AsContextMut, Caller, Extern, Instance, Linker, Memory, Store, TypedFunc};

use super::error::{WasmError, WasmResult};
use crate::engine::EngineHost;

pub const HOST_MODULE: &str = "verifier_host";
/// Returned in place of a packed pointer when there is nothing to return.
pub const ABSENT: i64 = -1;

const STDOUT_FD: i32 = 1;
const STDERR_FD: i32 = 2;

/// Pack a guest buffer into one `i64`: pointer high, length low.
pub fn pack(ptr: i32, len: i32) -> i64 {
    ((ptr as u32 as i64) << 32) | (len as u32 as i64)
}

/// Inverse of [`pack`]; `None` for [`ABSENT`] or any other negative value.
pub fn unpack(packed: i64) -> Option<(i32, i32)> {
    if packed < 0 {
        return None;
    }
    Some(((packed >> 32) as i32, (packed & 0xffff_ffff) as i32))
}

/// The guest exports used to move bytes across the boundary.
pub(crate) struct GuestMemory {
    memory: Memory,
    allocate: TypedFunc<i32, i32>,
    deallocate: TypedFunc<(i32, i32), ()>,
}

impl GuestMemory {
    pub(crate) fn from_instance(store: &mut Store<EngineHost>, instance: &Instance) -> WasmResult<Self> {
        let memory = instance
            .get_memory(&mut *store, "memory")
            .ok_or(WasmError::MissingExport("memory"))?;
        let allocate = instance
            .get_typed_func::<i32, i32>(&mut *store, "allocate")
            .map_err(|_| WasmError::MissingExport("allocate"))?;
        let deallocate = instance
            .get_typed_func::<(i32, i32), ()>(&mut *store, "deallocate")
            .map_err(|_| WasmError::MissingExport("deallocate"))?;
        Ok(Self {
            memory,
            allocate,
            deallocate,
        })
    }

    fn from_caller(caller: &mut Caller<'_, EngineHost>) -> wasmtime::Result<Self> {
        let memory = caller
            .get_export("memory")
            .and_then(Extern::into_memory)
            .ok_or_else(|| wasmtime::Error::msg("guest does not export 'memory'"))?;
        let allocate = caller
            .get_export("allocate")
            .and_then(Extern::into_func)
            .ok_or_else(|| wasmtime::Error::msg("guest does not export 'allocate'"))?
            .typed::<i32, i32>(&*caller)?;
        let deallocate = caller
            .get_export("deallocate")
            .and_then(Extern::into_func)
            .ok_or_else(|| wasmtime::Error::msg("guest does not export 'deallocate'"))?
            .typed::<(i32, i32), ()>(&*caller)?;
        Ok(Self {
            memory,
            allocate,
            deallocate,
        })
    }

    pub(crate) fn read(&self, store: impl AsContext, ptr: i32, len: i32) -> wasmtime::Result<Vec<u8>> {
        if len < 0 {
            return Err(wasmtime::Error::msg(format!("negative buffer length {}", len)));
        }
        let mut buffer = vec![0u8; len as usize];
        self.memory.read(store, ptr as u32 as usize, &mut buffer)?;
        Ok(buffer)
    }

    fn read_string(&self, store: impl AsContext, ptr: i32, len: i32) -> wasmtime::Result<String> {
        String::from_utf8(self.read(store, ptr, len)?).map_err(wasmtime::Error::new)
    }

    /// Copy `bytes` into a fresh guest allocation.
    pub(crate) fn write(&self, mut store: impl AsContextMut, bytes: &[u8]) -> wasmtime::Result<(i32, i32)> {
        let len = i32::try_from(bytes.len())
            .map_err(|_| wasmtime::Error::msg(format!("{} bytes do not fit in guest memory", bytes.len())))?;
        let ptr = self.allocate.call(&mut store, len)?;
        if ptr == 0 && len > 0 {
            return Err(wasmtime::Error::msg(format!("guest failed to allocate {} bytes", len)));
        }
        self.memory.write(&mut store, ptr as u32 as usize, bytes)?;
        Ok((ptr, len))
    }

    pub(crate) fn release(&self, store: impl AsContextMut, ptr: i32, len: i32) -> wasmtime::Result<()> {
        self.deallocate.call(store, (ptr, len))
    }

    /// Copy `bytes` into the guest and return them packed.
    fn pass(&self, store: impl AsContextMut, bytes: &[u8]) -> wasmtime::Result<i64> {
        let (ptr, len) = self.write(store, bytes)?;
        Ok(pack(ptr, len))
    }
}

/// Define every `verifier_host` import on `linker`.
pub fn add_to_linker(linker: &mut Linker<EngineHost>) -> wasmtime::Result<()> {
    linker.func_wrap(
        HOST_MODULE,
        "solver_ask",
        |mut caller: Caller<'_, EngineHost>, ptr: i32, len: i32| -> wasmtime::Result<i64> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let query = guest.read_string(&caller, ptr, len)?;
            // failures are logged by the bridge; the engine sees an error status
            match caller.data().ask(&query) {
                Ok(response) => guest.pass(&mut caller, response.as_bytes()),
                Err(_) => Ok(ABSENT),
            }
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "solver_refresh",
        |caller: Caller<'_, EngineHost>| -> i32 {
            match caller.data().refresh() {
                Ok(()) => 0,
                Err(_) => -1,
            }
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "fs_read",
        |mut caller: Caller<'_, EngineHost>, ptr: i32, len: i32| -> wasmtime::Result<i64> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let path = guest.read_string(&caller, ptr, len)?;
            let contents = caller.data().read_file(&path).map_err(wasmtime::Error::new)?;
            match contents {
                Some(bytes) => guest.pass(&mut caller, &bytes),
                None => Ok(ABSENT),
            }
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "fs_index",
        |mut caller: Caller<'_, EngineHost>| -> wasmtime::Result<i64> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let index = caller.data().index();
            guest.pass(&mut caller, &index)
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "fs_depcache",
        |mut caller: Caller<'_, EngineHost>| -> wasmtime::Result<i64> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let depcache = caller.data().depcache();
            guest.pass(&mut caller, &depcache)
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "channel_write",
        |mut caller: Caller<'_, EngineHost>, fd: i32, ptr: i32, len: i32| -> wasmtime::Result<()> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let bytes = guest.read(&caller, ptr, len)?;
            let text = String::from_utf8_lossy(&bytes);
            match fd {
                STDOUT_FD => caller.data().stdout(&text),
                STDERR_FD => caller.data().stderr(&text),
                other => {
                    return Err(wasmtime::Error::msg(format!("unknown output channel {}", other)))
                }
            }
            Ok(())
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "progress",
        |mut caller: Caller<'_, EngineHost>, ptr: i32, len: i32| -> wasmtime::Result<()> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let status = guest.read_string(&caller, ptr, len)?;
            caller.data().progress(Some(status));
            Ok(())
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "progress_clear",
        |caller: Caller<'_, EngineHost>| {
            caller.data().progress(None);
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "ide_message",
        |mut caller: Caller<'_, EngineHost>, ptr: i32, len: i32| -> wasmtime::Result<()> {
            let guest = GuestMemory::from_caller(&mut caller)?;
            let message = guest.read_string(&caller, ptr, len)?;
            caller.data().message(&message);
            Ok(())
        },
    )?;

    Ok(())
}
