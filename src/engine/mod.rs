// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine instance lifecycle.
//!
//! The adapter builds a fresh instance per one-shot request, wired to the
//! shared solver and filesystem through an [`EngineHost`], and runs it to
//! completion. Sessions keep one instance alive across many queries.

mod adapter;
mod capture;
mod host;
mod session;


pub use adapter::{EngineAdapter, Verification, VerifyFault, VerifyOptions};
pub use capture::LineBuffer;
pub use host::{EngineEvent, EngineHost};
pub use session::{EventStream, Session};
