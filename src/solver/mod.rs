// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Synchronous access to an asynchronously provisioned SMT solver.
//!
//! The engine calls [`SolverBridge::ask`] and [`SolverBridge::refresh`] from
//! inside its own synchronous execution, so both block on a real pipe read.
//! Provisioning ([`SolverBridge::init_async`]) happens on a blocking task and
//! reports back through a [`SolverInit`] event stream.

mod bootstrap;
mod bridge;
mod options;
mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use bootstrap::{SolverInit, SolverInitEvent};
pub use bridge::SolverBridge;
pub use options::solver_arguments;
pub use transport::{ProcessTransport, SolverTransport};
