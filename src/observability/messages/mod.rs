// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging, grouped by subsystem.
//!
//! * `worker` - request queue, readiness gate and bootstrap events
//! * `solver` - solver provisioning and per-query tracing
//! * `engine` - engine loading, instances and sessions
//! * `filesystem` - origin fetches and the shared file cache

use tracing::Span;

pub mod engine;
pub mod filesystem;
pub mod solver;
pub mod worker;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with its fields attached.
    fn log(&self);

    /// A span carrying the same fields, for wrapping the work the message
    /// describes.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker", span_name = name)
    }
}
