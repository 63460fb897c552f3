// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the shared filesystem.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Index and dependency cache were fetched.
///
/// # Log Level
/// `info!` - Bootstrap step
pub struct FilesystemOpened<'a> {
    pub origin: &'a str,
    pub root: &'a str,
    pub index_bytes: usize,
    pub depcache_bytes: usize,
}

impl Display for FilesystemOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mounted {} at {} (index {} bytes, depcache {} bytes)",
            self.origin, self.root, self.index_bytes, self.depcache_bytes
        )
    }
}

impl StructuredLog for FilesystemOpened<'_> {
    fn log(&self) {
        tracing::info!(
            origin = self.origin,
            root = self.root,
            index_bytes = self.index_bytes,
            depcache_bytes = self.depcache_bytes,
            "{}",
            self
        );
    }
}

/// A file was fetched from the origin and cached.
///
/// # Log Level
/// `debug!` - At most once per path
pub struct FileFetched<'a> {
    pub path: &'a str,
    pub size_bytes: usize,
}

impl Display for FileFetched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Fetched {} ({} bytes)", self.path, self.size_bytes)
    }
}

impl StructuredLog for FileFetched<'_> {
    fn log(&self) {
        tracing::debug!(path = self.path, size_bytes = self.size_bytes, "{}", self);
    }
}

/// Fetching a file failed; nothing was cached.
///
/// # Log Level
/// `error!` - Fatal for the requesting instance
pub struct FileFetchFailed<'a> {
    pub path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FileFetchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to fetch {}: {}", self.path, self.error)
    }
}

impl StructuredLog for FileFetchFailed<'_> {
    fn log(&self) {
        tracing::error!(path = self.path, error = %self.error, "{}", self);
    }
}
