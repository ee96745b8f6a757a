// Copyright 2026 the terminfo-db authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolving a terminal name to its database entry
//!
//! Compiled databases hash entries into leaf directories by the first
//! character of the terminal name, or by its hexadecimal form on systems
//! with case-insensitive filesystems. Decoded entries are memoized in a
//! caller-owned cache under every alias they declare.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::decode::{Error, Terminfo, decode};

/// The two leaf directories a terminal name may be filed under
fn candidate_paths(dir: &Path, name: &str) -> [PathBuf; 2] {
    let first_byte = name.as_bytes()[0];
    let first_char = first_byte as char;
    [
        dir.join(first_char.to_string()).join(name),
        dir.join(format!("{first_byte:02x}")).join(name),
    ]
}

/// Terminfo database rooted at a directory, with a cache of decoded entries
///
/// The cache never evicts; it is an accumulate-only memoization layer for
/// repeated lookups within the lifetime of the `Database`. The lock is not
/// held across file I/O, so lookups of different uncached names decode in
/// parallel.
#[derive(Debug, Default)]
pub struct Database {
    cache: Mutex<HashMap<String, Arc<Terminfo>>>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the entry for the terminal `name` from the database under `dir`
    ///
    /// Probes the first-character leaf directory, then the hexadecimal one.
    /// On success the entry is cached under every alias it declares and the
    /// shared instance is returned; later lookups of any alias hit the cache
    /// without touching the filesystem.
    pub fn load(&self, dir: impl AsRef<Path>, name: &str) -> Result<Arc<Terminfo>, Error> {
        if name.is_empty() {
            return Err(Error::EmptyTermName);
        }

        if let Some(terminfo) = self.lock().get(name) {
            return Ok(Arc::clone(terminfo));
        }

        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::DatabaseDirectoryNotFound);
        }

        let mut found = None;
        for path in candidate_paths(dir, name) {
            if let Ok(buffer) = fs::read(&path) {
                found = Some((path, buffer));
                break;
            }
        }
        let Some((path, buffer)) = found else {
            return Err(Error::FileNotFound);
        };

        let mut terminfo = decode(&buffer)?;
        terminfo.path = path;
        let terminfo = Arc::new(terminfo);

        let mut cache = self.lock();
        for alias in &terminfo.names {
            cache.insert(alias.clone(), Arc::clone(&terminfo));
        }
        Ok(terminfo)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Terminfo>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
