//! Staleness-aware caching for file-backed stores.
//!
//! # Overview
//!
//! [`CachedHtFile`] wraps one [`HtFile`] store and the path backing it. A
//! query re-reads the file only when its modification time differs from the
//! one recorded at the last successful load; an inaccessible file is served
//! from the last good parse instead of failing the caller. Staleness is
//! checked on demand; there is no watcher thread and nothing runs between
//! queries.
//!
//! # Reload decision
//!
//! On every [`read`](CachedHtFile::read), under the per-entry lock:
//!
//! 1. Path missing, not a regular file, or unreadable: serve the held store
//!    if one exists, otherwise fail with [`CacheError::Inaccessible`].
//! 2. Modification time unchanged since the last load: serve the held store
//!    without touching the file.
//! 3. Otherwise reload, reusing the held store instance after clearing it.
//!    Success records the new modification time. A failure *during the read*
//!    discards the held store and propagates [`CacheError::Io`]; the next
//!    query starts cold and must load from scratch.
//!
//! Serving stale data on access failure and dropping state on read failure
//! are both deliberate: an unlinked or momentarily unreadable file should not
//! log everyone out, while a half-read file must never be trusted.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use thiserror::Error;

use crate::htfile::HtFile;

/// Errors surfaced by [`CachedHtFile::read`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The path cannot be reached (missing, not a file, unreadable) and no
    /// previously loaded data exists to fall back on.
    #[error("file {} is not accessible", .path.display())]
    Inaccessible {
        /// The backing file path.
        path: PathBuf,
    },

    /// Reading the file failed mid-load. Cached state has been invalidated.
    #[error("failed to load {}: {source}", .path.display())]
    Io {
        /// The backing file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A successfully loaded store and the mtime it was loaded at.
///
/// The pairing is the cache invariant: a recorded mtime never outlives the
/// store it describes, so there is no "valid store, unknown mtime" state.
struct Loaded<T> {
    modified: SystemTime,
    store: T,
}

/// Mtime-keyed cache around one file-backed store.
///
/// Generic over any [`HtFile`] store constructible with `Default`. All
/// queries on one cache serialize on an internal lock, so concurrent callers
/// never reload twice for the same change and never observe a store
/// mid-reload.
pub struct CachedHtFile<T> {
    path: PathBuf,
    slot: Mutex<Option<Loaded<T>>>,
}

impl<T: HtFile + Default> CachedHtFile<T> {
    /// Create an empty cache for `path`. Nothing is read until the first
    /// query.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
        }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against up-to-date store contents.
    ///
    /// Performs the reload decision described in the module docs, then calls
    /// `f` with the (possibly stale-but-available) store. `f` runs under the
    /// cache lock; keep it short.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, CacheError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(&mut slot)?;
        match slot.as_ref() {
            Some(loaded) => Ok(f(&loaded.store)),
            None => Err(self.inaccessible()),
        }
    }

    /// Bring `slot` up to date with the file, per the reload decision.
    ///
    /// Postcondition: on `Ok`, the slot holds a store (fresh or stale).
    fn refresh(&self, slot: &mut Option<Loaded<T>>) -> Result<(), CacheError> {
        let modified = match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => meta.modified().ok(),
            _ => None,
        };
        let modified = match modified {
            Some(modified) => modified,
            None => {
                // Pre-check failed. Stale data beats no data.
                if slot.is_some() {
                    log::debug!(
                        "{} is not accessible, serving cached entries",
                        self.path.display()
                    );
                    return Ok(());
                }
                return Err(self.inaccessible());
            }
        };

        if matches!(slot.as_ref(), Some(loaded) if loaded.modified == modified) {
            return Ok(());
        }

        // Open before giving up the held store, so an unreadable file lands
        // in the stale-fallback branch rather than invalidating good data.
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) => {
                if slot.is_some() {
                    log::warn!(
                        "cannot open {} ({err}), serving cached entries",
                        self.path.display()
                    );
                    return Ok(());
                }
                return Err(self.inaccessible());
            }
        };

        let mut store = match slot.take() {
            Some(previous) => {
                log::info!(
                    "modification detected on {}, reloading",
                    self.path.display()
                );
                let mut store = previous.store;
                store.clear();
                store
            }
            None => T::default(),
        };

        // On failure the slot stays empty: recorded state is gone and the
        // next query performs a full fresh load regardless of mtime.
        self.load_into(&mut store, BufReader::new(file))?;
        *slot = Some(Loaded { modified, store });
        Ok(())
    }

    fn load_into<R: BufRead>(&self, store: &mut T, reader: R) -> Result<(), CacheError> {
        store.load(reader).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn inaccessible(&self) -> CacheError {
        CacheError::Inaccessible {
            path: self.path.clone(),
        }
    }
}

impl<T> std::fmt::Debug for CachedHtFile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedHtFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
