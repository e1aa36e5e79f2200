//! Memoizing dataset loader.
//!
//! Maps each source (by canonical path) to a once-cell holding the enriched
//! table. The map lock is held only to look up or insert a cell; loading
//! happens outside it, so different sources load in parallel while
//! concurrent callers for the same source wait on a single in-flight load.
//!
//! # Thread Safety
//!
//! `DatasetCache` is `Send + Sync` and is meant to be shared through an
//! `Arc`. Returned tables are `Arc<DataFrame>` and are never mutated, so
//! any number of filters can read them concurrently without locking.

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::config::LoadOptions;
use crate::error::{ProcessingError, Result};
use crate::preparer::DatasetPreparer;

type Slot = Arc<OnceCell<Arc<DataFrame>>>;

/// Loads each source at most once and hands out shared references.
///
/// A failed load is not cached; the next caller retries it.
#[derive(Debug, Default)]
pub struct DatasetCache {
    preparer: DatasetPreparer,
    slots: Mutex<HashMap<PathBuf, Slot>>,
    loads: AtomicUsize,
}

static_assertions::assert_impl_all!(DatasetCache: Send, Sync);

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            preparer: DatasetPreparer::new(options),
            slots: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the enriched table for `path`, loading it on first use.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<DataFrame>> {
        let key = Self::key(path.as_ref())?;
        let slot = self.slot(&key);

        let result = slot
            .get_or_try_init(|| {
                self.loads.fetch_add(1, Ordering::SeqCst);
                info!("Cache miss for {}", key.display());
                self.preparer.load(&key).map(Arc::new)
            })
            .cloned();

        if result.is_err() {
            self.discard_empty(&key, &slot);
        }
        result
    }

    /// Drop the cached table for `path`. Returns whether an entry existed.
    ///
    /// Callers already holding the table keep their reference.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        let Ok(key) = Self::key(path.as_ref()) else {
            return false;
        };
        let removed = self.slots.lock().remove(&key).is_some();
        if removed {
            debug!("Invalidated cached dataset {}", key.display());
        }
        removed
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Number of sources with a cache entry (loaded or in flight).
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// How many times a load has actually been started.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn key(path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .map_err(|_| ProcessingError::NotFound(path.to_path_buf()))
    }

    fn slot(&self, key: &Path) -> Slot {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(key.to_path_buf()).or_default())
    }

    /// Remove `slot` after a failed load, unless it was replaced or filled
    /// by another caller in the meantime.
    fn discard_empty(&self, key: &Path, slot: &Slot) {
        let mut slots = self.slots.lock();
        let unused = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if unused {
            slots.remove(key);
            debug!("Dropped empty cache entry for {}", key.display());
        }
    }
}
