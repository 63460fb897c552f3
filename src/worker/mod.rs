// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The worker process: bootstrap, the readiness gate, and the stdio loop.
//!
//! ```text
//! bootstrap tasks ──BootstrapEvent──┐
//!                                   ├─► Worker loop ─► RequestQueue ─► EngineAdapter
//! host stdin ──VERIFY──────────────┘                        │
//!                                                            └─► outbox ─► host stdout
//! ```
//!
//! While booting, the loop selects between bootstrap events and host input
//! and buffers every request. Once the engine, solver and filesystem are all
//! up it emits READY, drains the buffer in order, then runs each further
//! request inline as it arrives.

mod bootstrap;
mod gate;
mod runtime;


pub use bootstrap::{start, Bootstrap, BootstrapEvent, BootstrapStep};
pub use gate::{Dispatch, RequestQueue};
pub use runtime::Worker;
