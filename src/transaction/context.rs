//! Transaction context using typestate pattern.
//!
//! The typestate pattern ensures at compile time that transactions
//! are used correctly:
//! - Only active transactions can stage changes
//! - Committed/aborted transactions cannot be reused
//! - The writer slot is released however the transaction ends

use std::marker::PhantomData;

use crate::rdf::Graph;
use crate::storage::{Dataset, GraphStore, WriterPermit};
use crate::transaction::error::{TransactionError, TransactionResult};

/// Marker type for active transactions.
#[derive(Debug)]
pub struct TxActive;

/// Marker type for committed transactions.
#[derive(Debug)]
pub struct TxCommitted;

/// Marker type for aborted transactions.
#[derive(Debug)]
pub struct TxAborted;

/// Transaction metadata stored in the manager.
#[derive(Debug, Clone)]
pub struct TransactionMetadata {
    /// Unique transaction ID.
    pub tx_id: String,
    /// Statement count of the snapshot the transaction started from.
    pub base_statements: usize,
    /// When the transaction started.
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// A write transaction with typestate for lifecycle safety.
///
/// The `State` parameter tracks whether the transaction is:
/// - `TxActive`: holds the writer slot and a staged copy of the dataset
/// - `TxCommitted`: staged dataset was published
/// - `TxAborted`: staged dataset was discarded
pub struct Transaction<State> {
    /// Transaction metadata.
    pub(crate) metadata: TransactionMetadata,
    store: GraphStore,
    staged: Dataset,
    dirty: bool,
    permit: Option<WriterPermit>,
    _state: PhantomData<State>,
}

impl<State> Transaction<State> {
    /// Get the transaction ID.
    pub fn id(&self) -> &str {
        &self.metadata.tx_id
    }

    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.metadata.started_at
    }

    fn into_state<Next>(self) -> Transaction<Next> {
        Transaction {
            metadata: self.metadata,
            store: self.store,
            staged: self.staged,
            dirty: self.dirty,
            permit: self.permit,
            _state: PhantomData,
        }
    }
}

impl Transaction<TxActive> {
    /// Create a new active transaction. Blocks until the writer slot is free.
    pub(crate) fn new(store: GraphStore, tx_id: String) -> Self {
        let permit = store.acquire_writer();
        // snapshot taken after acquiring the slot so no publish is missed
        let staged = (*store.snapshot()).clone();
        Self {
            metadata: TransactionMetadata {
                tx_id,
                base_statements: staged.len(),
                started_at: chrono::Utc::now(),
            },
            store,
            staged,
            dirty: false,
            permit: Some(permit),
            _state: PhantomData,
        }
    }

    /// The staged dataset, including this transaction's own writes.
    pub fn dataset(&self) -> &Dataset {
        &self.staged
    }

    pub fn dataset_mut(&mut self) -> &mut Dataset {
        self.dirty = true;
        &mut self.staged
    }

    pub fn default_graph(&self) -> &Graph {
        self.staged.default_graph()
    }

    pub fn default_graph_mut(&mut self) -> &mut Graph {
        self.dirty = true;
        self.staged.default_graph_mut()
    }

    /// True once anything was borrowed mutably.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Publish the staged dataset.
    ///
    /// A transaction that never touched the dataset commits without
    /// publishing.
    pub fn commit(mut self) -> TransactionResult<Transaction<TxCommitted>> {
        let permit = self.permit.take().ok_or_else(|| TransactionError::NotActive {
            tx_id: self.metadata.tx_id.clone(),
            state: "released".to_string(),
        })?;
        if self.dirty {
            let staged = std::mem::take(&mut self.staged);
            self.store.publish(&permit, staged)?;
            tracing::debug!(tx = %self.metadata.tx_id, "published transaction");
        }
        drop(permit);
        Ok(self.into_state())
    }

    /// Discard the staged dataset.
    pub fn rollback(mut self) -> Transaction<TxAborted> {
        self.permit.take();
        self.staged = Dataset::new();
        tracing::debug!(tx = %self.metadata.tx_id, "rolled back transaction");
        self.into_state()
    }
}

impl Transaction<TxCommitted> {
    pub fn was_published(&self) -> bool {
        self.dirty
    }
}

impl<State> std::fmt::Debug for Transaction<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.metadata.tx_id)
            .field("dirty", &self.dirty)
            .field("holds_writer", &self.permit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::rdfs;
    use crate::rdf::{Iri, Literal};

    fn label(tx: &mut Transaction<TxActive>, text: &str) {
        tx.default_graph_mut().insert(
            Iri::new("http://example.com/a").unwrap(),
            rdfs::LABEL,
            Literal::string(text),
        );
    }

    #[test]
    fn test_commit_publishes() {
        let store = GraphStore::in_memory();
        let mut tx = Transaction::new(store.clone(), "t1".to_string());
        label(&mut tx, "x");
        assert!(store.snapshot().is_empty());
        let committed = tx.commit().unwrap();
        assert!(committed.was_published());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_rollback_discards() {
        let store = GraphStore::in_memory();
        let mut tx = Transaction::new(store.clone(), "t1".to_string());
        label(&mut tx, "x");
        tx.rollback();
        assert!(store.snapshot().is_empty());
        // writer slot was released
        let tx2 = Transaction::new(store.clone(), "t2".to_string());
        assert!(!tx2.commit().unwrap().was_published());
    }

    #[test]
    fn test_sees_own_writes() {
        let store = GraphStore::in_memory();
        let mut tx = Transaction::new(store, "t1".to_string());
        label(&mut tx, "x");
        assert_eq!(tx.default_graph().len(), 1);
    }
}
