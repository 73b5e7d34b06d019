//! The graph store: published snapshot, writer exclusion, persistence.
//!
//! Readers clone an `Arc<Dataset>` and never block. A single writer at a
//! time stages changes on a private copy of the dataset; publishing swaps
//! the snapshot pointer so readers see all of a write or none of it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};
use tempfile::NamedTempFile;

use crate::storage::dataset::Dataset;
use crate::storage::error::{StorageError, StorageResult};

/// Shared handle to the graph store. Clone to share across threads.
#[derive(Clone)]
pub struct GraphStore {
    inner: Arc<GraphStoreInner>,
}

struct GraphStoreInner {
    current: RwLock<Arc<Dataset>>,
    writer_active: Mutex<bool>,
    writer_released: Condvar,
    path: Option<PathBuf>,
}

impl GraphStore {
    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::with_dataset(Dataset::new(), None)
    }

    /// Open a store persisted as an N-Quads file.
    pub fn open(path: impl AsRef<Path>, create_if_missing: bool) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let dataset = if path.exists() {
            let file = File::open(&path)?;
            Dataset::read_nquads(BufReader::new(file)).map_err(|source| {
                StorageError::CorruptedData {
                    path: path.clone(),
                    source,
                }
            })?
        } else if create_if_missing {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Dataset::new()
        } else {
            return Err(StorageError::NotInitialized(path));
        };
        tracing::debug!(path = %path.display(), statements = dataset.len(), "opened graph store");
        Ok(Self::with_dataset(dataset, Some(path)))
    }

    fn with_dataset(dataset: Dataset, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(GraphStoreInner {
                current: RwLock::new(Arc::new(dataset)),
                writer_active: Mutex::new(false),
                writer_released: Condvar::new(),
                path,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.inner.current.read().clone()
    }

    /// Block until no other writer is active, then claim the writer slot.
    pub(crate) fn acquire_writer(&self) -> WriterPermit {
        let mut active = self.inner.writer_active.lock();
        while *active {
            self.inner.writer_released.wait(&mut active);
        }
        *active = true;
        WriterPermit {
            store: self.clone(),
        }
    }

    /// Persist (if file backed) and publish a staged dataset.
    ///
    /// On a persistence failure nothing is published.
    pub(crate) fn publish(&self, _permit: &WriterPermit, dataset: Dataset) -> StorageResult<()> {
        if let Some(path) = &self.inner.path {
            persist(path, &dataset)?;
        }
        *self.inner.current.write() = Arc::new(dataset);
        Ok(())
    }

    fn release_writer(&self) {
        let mut active = self.inner.writer_active.lock();
        *active = false;
        self.inner.writer_released.notify_one();
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("path", &self.inner.path)
            .field("statements", &self.snapshot().len())
            .finish()
    }
}

/// Exclusive right to publish. Released on drop.
pub(crate) struct WriterPermit {
    store: GraphStore,
}

impl Drop for WriterPermit {
    fn drop(&mut self) {
        self.store.release_writer();
    }
}

fn persist(path: &Path, dataset: &Dataset) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let to_persist_error = |source: std::io::Error| StorageError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let tmp = NamedTempFile::new_in(&dir).map_err(to_persist_error)?;
    {
        let mut w = BufWriter::new(tmp.as_file());
        dataset.write_nquads(&mut w).map_err(|e| match e {
            crate::rdf::RdfError::Io(io) => to_persist_error(io),
            other => StorageError::Rdf(other),
        })?;
        w.flush().map_err(to_persist_error)?;
    }
    tmp.as_file().sync_all().map_err(to_persist_error)?;
    tmp.persist(path).map_err(|e| to_persist_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::rdfs;
    use crate::rdf::{Iri, Literal};
    use tempfile::TempDir;

    fn staged_with_label(store: &GraphStore, label: &str) -> Dataset {
        let mut ds = (*store.snapshot()).clone();
        ds.default_graph_mut().insert(
            Iri::new("http://example.com/a").unwrap(),
            rdfs::LABEL,
            Literal::string(label),
        );
        ds
    }

    #[test]
    fn test_snapshot_unaffected_by_publish() {
        let store = GraphStore::in_memory();
        let before = store.snapshot();
        let permit = store.acquire_writer();
        store.publish(&permit, staged_with_label(&store, "x")).unwrap();
        drop(permit);
        assert!(before.is_empty());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_open_missing_without_create() {
        let dir = TempDir::new().unwrap();
        let err = GraphStore::open(dir.path().join("none.nq"), false).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_persist_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("store.nq");
        {
            let store = GraphStore::open(&path, true).unwrap();
            let permit = store.acquire_writer();
            store.publish(&permit, staged_with_label(&store, "kept")).unwrap();
        }
        let reopened = GraphStore::open(&path, false).unwrap();
        assert_eq!(reopened.snapshot().len(), 1);
    }

    #[test]
    fn test_writers_are_serialized() {
        let store = GraphStore::in_memory();
        let permit = store.acquire_writer();
        let other = store.clone();
        let handle = std::thread::spawn(move || {
            let permit = other.acquire_writer();
            let staged = staged_with_label(&other, "second");
            other.publish(&permit, staged).unwrap();
        });
        std::thread::sleep(std::time::Duration::from_millis(50));
        store.publish(&permit, staged_with_label(&store, "first")).unwrap();
        drop(permit);
        handle.join().unwrap();
        // the second writer started from the first writer's snapshot
        assert_eq!(store.snapshot().len(), 2);
    }
}
