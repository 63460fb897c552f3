// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io;
use std::path::{Component, Path, PathBuf};

/// A read-only source of library files, addressed by relative path.
pub trait Origin: Send + Sync {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Files under a fixed local directory.
pub struct DirectoryOrigin {
    prefix: PathBuf,
}

impl DirectoryOrigin {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn locate(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' does not name a file inside the origin", path),
            ));
        }
        Ok(self.prefix.join(relative))
    }
}

impl Origin for DirectoryOrigin {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.locate(path)?)
    }

    fn describe(&self) -> String {
        self.prefix.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_nested_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("ulib")).unwrap();
        std::fs::write(dir.path().join("ulib/Prims.fst"), b"module Prims").unwrap();

        let origin = DirectoryOrigin::new(dir.path());
        assert_eq!(origin.fetch("ulib/Prims.fst").unwrap(), b"module Prims");
        assert_eq!(origin.fetch("./ulib/Prims.fst").unwrap(), b"module Prims");
    }

    #[test]
    fn test_rejects_paths_escaping_the_prefix() {
        let dir = TempDir::new().unwrap();
        let origin = DirectoryOrigin::new(dir.path().join("lib"));

        for path in ["../secret", "ulib/../../secret", "/etc/passwd", ""] {
            let err = origin.fetch(path).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{path}");
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let origin = DirectoryOrigin::new(dir.path());
        assert_eq!(
            origin.fetch("Missing.fst").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
