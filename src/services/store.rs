//! Library store
//!
//! Holds the most recently ingested library behind an explicit interface.
//! - `replace` commits a new library and stamps it
//! - `get` returns the current snapshot and when it was committed
//! - `update` applies a single-item mutation and re-stamps the snapshot

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::error::{LibraryError, Result};
use crate::models::Library;

/// Committed library plus its commit time
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub library: Arc<Library>,
    pub updated_at: DateTime<Utc>,
}

pub trait LibraryStore: Send + Sync {
    /// Replace the whole library (a new ingest)
    fn replace(&self, library: Library) -> Snapshot;

    /// Current snapshot, `None` before the first ingest
    fn get(&self) -> Option<Snapshot>;

    /// Mutate the current library in place
    fn update<T>(&self, f: impl FnOnce(&mut Library) -> Result<T>) -> Result<T>
    where
        Self: Sized;
}

/// In-process store; clones share the same library
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Option<Snapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LibraryStore for MemoryStore {
    fn replace(&self, library: Library) -> Snapshot {
        let snapshot = Snapshot {
            library: Arc::new(library),
            updated_at: Utc::now(),
        };

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(snapshot.clone());

        tracing::info!(
            entries = snapshot.library.total_entries(),
            updated_at = %snapshot.updated_at,
            "Library replaced"
        );
        snapshot
    }

    fn get(&self) -> Option<Snapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update<T>(&self, f: impl FnOnce(&mut Library) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let current = guard.as_mut().ok_or(LibraryError::EmptyStore)?;

        let library = Arc::make_mut(&mut current.library);
        let value = f(library)?;
        current.updated_at = Utc::now();

        Ok(value)
    }
}
