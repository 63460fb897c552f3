// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The library files engines read, fetched lazily from a fixed origin and
//! shared by every engine instance for the life of the worker.

mod lazy;
mod origin;

pub use lazy::SharedFilesystem;
pub use origin::{DirectoryOrigin, Origin};
