// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use super::origin::Origin;
use crate::config::consts::{DEPCACHE_FILE, INDEX_FILE};
use crate::errors::ResolverError;
use crate::observability::messages::filesystem::{FileFetchFailed, FileFetched, FilesystemOpened};
use crate::observability::messages::StructuredLog;

/// Index, dependency cache and an append-only cache of fetched files.
///
/// Entries are never replaced once cached, so a path is fetched from the
/// origin at most once per worker. The cache lock is held across a fetch,
/// which keeps that guarantee even with concurrent sessions.
pub struct SharedFilesystem {
    origin: Box<dyn Origin>,
    root: String,
    index: Arc<[u8]>,
    depcache: Arc<[u8]>,
    files: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl SharedFilesystem {
    /// Fetch the index and dependency cache and mount them under `root`.
    pub fn open(origin: impl Origin + 'static, root: impl Into<String>) -> Result<Self, ResolverError> {
        let root = root.into();
        let fetch = |path: &str| {
            origin.fetch(path).map_err(|source| ResolverError {
                path: path.to_string(),
                source,
            })
        };

        let index = fetch(INDEX_FILE)?;
        serde_json::from_slice::<serde_json::Value>(&index).map_err(|e| ResolverError {
            path: INDEX_FILE.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        let depcache = fetch(DEPCACHE_FILE)?;

        FilesystemOpened {
            origin: &origin.describe(),
            root: &root,
            index_bytes: index.len(),
            depcache_bytes: depcache.len(),
        }
        .log();

        Ok(Self {
            origin: Box::new(origin),
            root,
            index: index.into(),
            depcache: depcache.into(),
            files: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn index(&self) -> Arc<[u8]> {
        Arc::clone(&self.index)
    }

    pub fn depcache(&self) -> Arc<[u8]> {
        Arc::clone(&self.depcache)
    }

    /// `path` relative to the mount root, if it lies under it.
    pub fn relative_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.root.as_str())
            .filter(|relative| !relative.is_empty())
    }

    /// Cached bytes for `path`, fetching them from the origin the first time.
    ///
    /// `progress` sees `Some("Fetching <path>…")` before a fetch and `None`
    /// after it, whether it succeeded or not. A failed fetch caches nothing.
    pub fn resolve(
        &self,
        path: &str,
        progress: &mut dyn FnMut(Option<String>),
    ) -> Result<Arc<[u8]>, ResolverError> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bytes) = files.get(path) {
            return Ok(Arc::clone(bytes));
        }

        progress(Some(format!("Fetching {}…", path)));
        let fetched = self.origin.fetch(path);
        progress(None);

        match fetched {
            Ok(bytes) => {
                FileFetched {
                    path,
                    size_bytes: bytes.len(),
                }
                .log();
                let bytes: Arc<[u8]> = bytes.into();
                files.insert(path.to_string(), Arc::clone(&bytes));
                Ok(bytes)
            }
            Err(source) => {
                FileFetchFailed {
                    path,
                    error: &source,
                }
                .log();
                Err(ResolverError {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    /// Number of files fetched so far.
    pub fn cached_files(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory origin that counts fetches per path.
    struct CountingOrigin {
        files: HashMap<&'static str, &'static str>,
        fetches: Arc<Mutex<HashMap<String, usize>>>,
    }

    impl Origin for CountingOrigin {
        fn fetch(&self, path: &str) -> io::Result<Vec<u8>> {
            *self
                .fetches
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default() += 1;
            self.files
                .get(path)
                .map(|contents| contents.as_bytes().to_vec())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn counting(files: &[(&'static str, &'static str)]) -> (CountingOrigin, Arc<Mutex<HashMap<String, usize>>>) {
        let fetches = Arc::new(Mutex::new(HashMap::new()));
        let mut all: HashMap<_, _> = files.iter().copied().collect();
        all.entry(INDEX_FILE).or_insert("{}");
        all.entry(DEPCACHE_FILE).or_insert("");
        (
            CountingOrigin {
                files: all,
                fetches: Arc::clone(&fetches),
            },
            fetches,
        )
    }

    #[test]
    fn test_open_reads_index_and_depcache() {
        let (origin, _) = counting(&[(INDEX_FILE, r#"{"files":["Prims.fst"]}"#), (DEPCACHE_FILE, "deps")]);
        let fs = SharedFilesystem::open(origin, "/fstar/").unwrap();
        assert_eq!(&*fs.index(), br#"{"files":["Prims.fst"]}"#);
        assert_eq!(&*fs.depcache(), b"deps");
        assert_eq!(fs.cached_files(), 0);
    }

    #[test]
    fn test_open_rejects_invalid_index() {
        let (origin, _) = counting(&[(INDEX_FILE, "not json")]);
        let err = SharedFilesystem::open(origin, "/fstar/").err().unwrap();
        assert_eq!(err.path, INDEX_FILE);
        assert_eq!(err.source.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_open_requires_depcache() {
        let fetches = Arc::new(Mutex::new(HashMap::new()));
        let origin = CountingOrigin {
            files: HashMap::from([(INDEX_FILE, "[]")]),
            fetches,
        };
        let err = SharedFilesystem::open(origin, "/fstar/").err().unwrap();
        assert_eq!(err.path, DEPCACHE_FILE);
    }

    #[test]
    fn test_each_path_fetched_at_most_once() {
        let (origin, fetches) = counting(&[("Prims.fst", "module Prims")]);
        let fs = SharedFilesystem::open(origin, "/fstar/").unwrap();
        let progress_calls = AtomicUsize::new(0);
        let mut progress = |_: Option<String>| {
            progress_calls.fetch_add(1, Ordering::Relaxed);
        };

        for _ in 0..3 {
            assert_eq!(&*fs.resolve("Prims.fst", &mut progress).unwrap(), b"module Prims");
        }

        assert_eq!(fetches.lock().unwrap()["Prims.fst"], 1);
        assert_eq!(progress_calls.load(Ordering::Relaxed), 2);
        assert_eq!(fs.cached_files(), 1);
    }

    #[test]
    fn test_progress_brackets_the_fetch() {
        let (origin, _) = counting(&[("FStar.List.fst", "module FStar.List")]);
        let fs = SharedFilesystem::open(origin, "/fstar/").unwrap();
        let mut seen = Vec::new();

        fs.resolve("FStar.List.fst", &mut |status| seen.push(status)).unwrap();

        assert_eq!(seen, vec![Some("Fetching FStar.List.fst…".to_string()), None]);
    }

    #[test]
    fn test_failed_fetch_caches_nothing() {
        let (origin, fetches) = counting(&[("Prims.fst", "module Prims")]);
        let fs = SharedFilesystem::open(origin, "/fstar/").unwrap();
        let mut seen = Vec::new();

        let err = fs.resolve("Missing.fst", &mut |s| seen.push(s)).unwrap_err();
        assert_eq!(err.path, "Missing.fst");
        assert_eq!(seen.last(), Some(&None));
        assert_eq!(fs.cached_files(), 0);

        // other paths are unaffected, and the failed one may be retried
        assert!(fs.resolve("Prims.fst", &mut |_| {}).is_ok());
        assert!(fs.resolve("Missing.fst", &mut |_| {}).is_err());
        assert_eq!(fetches.lock().unwrap()["Missing.fst"], 2);
    }

    #[test]
    fn test_relative_path_strips_root() {
        let (origin, _) = counting(&[]);
        let fs = SharedFilesystem::open(origin, "/fstar/").unwrap();
        assert_eq!(fs.relative_path("/fstar/ulib/Prims.fst"), Some("ulib/Prims.fst"));
        assert_eq!(fs.relative_path("/fstar/"), None);
        assert_eq!(fs.relative_path("A.fst"), None);
        assert_eq!(fs.relative_path("/tmp/A.fst"), None);
    }
}
