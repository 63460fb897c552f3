// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the worker.
//!
//! Every diagnostic the worker produces is a small struct with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation that picks
//! the level and attaches fields. Keeping the text here instead of inline at
//! call sites keeps wording consistent across subsystems.
//!
//! Logs are written to stderr; stdout belongs to the host protocol.
//!
//! # Usage
//!
//! ```rust
//! use verification_worker::observability::messages::solver::QueryStarted;
//! use verification_worker::observability::messages::StructuredLog;
//!
//! QueryStarted { query: 7 }.log();
//! ```

pub mod messages;
