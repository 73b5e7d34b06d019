//! Transaction manager - coordinates all transaction operations.
//!
//! The TransactionManager is the main entry point for transactions.
//! It handles:
//! - Write transaction creation and lifecycle
//! - Tracking active transactions
//! - Handing out read snapshots

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use ulid::Ulid;

use crate::storage::{Dataset, GraphStore};
use crate::transaction::context::{Transaction, TransactionMetadata, TxActive};
use crate::transaction::error::{TransactionError, TransactionResult};

/// Transaction manager - coordinates all transaction operations.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone)]
pub struct TransactionManager {
    inner: Arc<TransactionManagerInner>,
}

struct TransactionManagerInner {
    /// The underlying graph store.
    store: GraphStore,
    /// Active transactions tracked by ID.
    active: RwLock<HashMap<String, TransactionMetadata>>,
}

impl TransactionManager {
    /// Create a new transaction manager for the given store.
    pub fn new(store: GraphStore) -> Self {
        Self {
            inner: Arc::new(TransactionManagerInner {
                store,
                active: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &GraphStore {
        &self.inner.store
    }

    /// The latest committed state. Never blocks on writers.
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.inner.store.snapshot()
    }

    /// Begin a write transaction, waiting for any other writer to finish.
    pub fn begin(&self) -> Transaction<TxActive> {
        let tx_id = Ulid::new().to_string().to_lowercase();
        let tx = Transaction::new(self.inner.store.clone(), tx_id.clone());
        self.inner.active.write().insert(tx_id, tx.metadata.clone());
        tx
    }

    /// Get the number of active transactions.
    pub fn active_count(&self) -> usize {
        self.inner.active.read().len()
    }

    /// Check if a transaction is active.
    pub fn is_active(&self, tx_id: &str) -> bool {
        self.inner.active.read().contains_key(tx_id)
    }

    /// Get metadata for an active transaction.
    pub fn get_transaction_info(&self, tx_id: &str) -> Option<TransactionMetadata> {
        self.inner.active.read().get(tx_id).cloned()
    }

    /// Mark a transaction as completed (committed or aborted).
    pub(crate) fn mark_completed(&self, tx_id: &str) {
        self.inner.active.write().remove(tx_id);
    }

    /// Commit a transaction.
    pub fn commit_transaction(&self, tx: Transaction<TxActive>) -> TransactionResult<()> {
        let tx_id = tx.id().to_string();
        let result = tx.commit();
        // a failed publish still ends the transaction
        self.mark_completed(&tx_id);
        result.map(|_| ())
    }

    /// Rollback a transaction.
    pub fn rollback_transaction(&self, tx: Transaction<TxActive>) {
        let tx_id = tx.id().to_string();
        tx.rollback();
        self.mark_completed(&tx_id);
    }

    /// Execute a function within a transaction, automatically committing or rolling back.
    ///
    /// If the function returns Ok, the transaction is committed.
    /// If the function returns Err or panics, the staged changes are discarded.
    pub fn with_write<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<TxActive>) -> Result<T, E>,
        E: From<TransactionError>,
    {
        let mut tx = self.begin();
        let _tracking = ActiveGuard {
            manager: self,
            tx_id: tx.id().to_string(),
        };

        match f(&mut tx) {
            Ok(result) => {
                self.commit_transaction(tx)?;
                Ok(result)
            }
            Err(e) => {
                self.rollback_transaction(tx);
                Err(e)
            }
        }
    }

    /// Run a read-only function against the current snapshot.
    pub fn with_read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Dataset) -> T,
    {
        let snapshot = self.snapshot();
        f(&snapshot)
    }
}

/// Drops the active entry if the closure panics.
struct ActiveGuard<'a> {
    manager: &'a TransactionManager,
    tx_id: String,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.manager.mark_completed(&self.tx_id);
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("active_count", &self.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::rdfs;
    use crate::rdf::{Iri, Literal};

    fn setup() -> TransactionManager {
        TransactionManager::new(GraphStore::in_memory())
    }

    fn subject() -> Iri {
        Iri::new("http://example.com/a").unwrap()
    }

    #[test]
    fn test_begin_and_commit() {
        let manager = setup();

        let mut tx = manager.begin();
        assert_eq!(manager.active_count(), 1);
        assert!(manager.is_active(tx.id()));

        tx.default_graph_mut()
            .insert(subject(), rdfs::LABEL, Literal::string("Alice"));
        manager.commit_transaction(tx).unwrap();

        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.snapshot().len(), 1);
    }

    #[test]
    fn test_with_write_rolls_back_on_error() {
        let manager = setup();

        let result: Result<(), TransactionError> = manager.with_write(|tx| {
            tx.default_graph_mut()
                .insert(subject(), rdfs::LABEL, Literal::string("Bob"));
            Err(TransactionError::InvalidOperation("abort".to_string()))
        });

        assert!(result.is_err());
        assert!(manager.snapshot().is_empty());
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_with_write_commits() {
        let manager = setup();

        let n: Result<usize, TransactionError> = manager.with_write(|tx| {
            tx.default_graph_mut()
                .insert(subject(), rdfs::LABEL, Literal::string("Carol"));
            Ok(tx.default_graph().len())
        });

        assert_eq!(n.unwrap(), 1);
        assert_eq!(manager.with_read(|ds| ds.len()), 1);
    }

    #[test]
    fn test_snapshot_isolation() {
        let manager = setup();
        let before = manager.snapshot();

        let mut tx = manager.begin();
        tx.default_graph_mut()
            .insert(subject(), rdfs::LABEL, Literal::string("Dave"));
        // readers do not see staged writes
        assert!(manager.snapshot().is_empty());
        manager.commit_transaction(tx).unwrap();

        assert!(before.is_empty());
        assert_eq!(manager.snapshot().len(), 1);
    }
}
