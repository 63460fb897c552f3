// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host ↔ worker message vocabulary and its newline-delimited JSON framing.
//!
//! Every message is one JSON object per line, tagged by `kind` with the
//! data under `payload`:
//!
//! ```text
//! host   → worker  {"kind":"VERIFY","payload":{"fname":"A.fst","fcontents":null,"args":[]}}
//! worker → host    {"kind":"READY"}
//! worker → host    {"kind":"STDOUT","payload":"Verified module: A\n"}
//! worker → host    {"kind":"VERIFICATION_COMPLETE","payload":{"exitCode":0,"stdout":[..],"stderr":[]}}
//! ```
//!
//! Ordering: every STDOUT/STDERR/PROGRESS message caused by request N is
//! written before N's VERIFICATION_COMPLETE, and that completion is written
//! before anything caused by request N+1.

mod codec;
mod messages;

pub use codec::{HostReader, HostWriter};
pub use messages::{ClientMessage, CompletionResult, VerifyRequest, WorkerMessage};
