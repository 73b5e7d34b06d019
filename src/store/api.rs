//! Store API - high-level interface over the registry.

use std::io::BufRead;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::StoreConfig;
use crate::core::{Register, RegisterItem, RegisterView, Status, TypedDescription, ViewOptions};
use crate::lock::{LockGuard, LockTable};
use crate::rdf::{Graph, Iri};
use crate::storage::{Bindings, GraphStore, Query};
use crate::store::entry::{DelegationRecord, EntityInfo, RegisterEntryInfo};
use crate::store::error::{StoreError, StoreResult};
use crate::store::export::TreeSink;
use crate::store::filter::FilterSpec;
use crate::store::reader::{ItemBatch, StoreReader};
use crate::store::search::{LiteralTextIndex, SearchRequest, TextIndex};
use crate::store::writer::StoreWriter;
use crate::transaction::TransactionManager;
use crate::version::VersionInfo;

struct StoreInner {
    config: StoreConfig,
    tx_manager: TransactionManager,
    locks: LockTable,
    text_index: Arc<dyn TextIndex>,
}

/// The registry store handle. Clones share the same dataset and lock table.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Open or create a store with the built-in literal text index.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        Self::open_with_index(config, Arc::new(LiteralTextIndex))
    }

    pub fn open_with_index(config: StoreConfig, text_index: Arc<dyn TextIndex>) -> StoreResult<Self> {
        let graph_store = match &config.path {
            Some(path) => GraphStore::open(path, config.create_if_missing)?,
            None => GraphStore::in_memory(),
        };
        Ok(Self {
            inner: Arc::new(StoreInner {
                config,
                tx_manager: TransactionManager::new(graph_store),
                locks: LockTable::new(),
                text_index,
            }),
        })
    }

    /// Create a new in-memory store (for testing).
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                config: StoreConfig::in_memory(),
                tx_manager: TransactionManager::new(GraphStore::in_memory()),
                locks: LockTable::new(),
                text_index: Arc::new(LiteralTextIndex),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.inner.tx_manager
    }

    /// Run `f` against the latest committed snapshot.
    pub fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&StoreReader<'_>) -> T,
    {
        let index = self.inner.text_index.as_ref();
        self.inner
            .tx_manager
            .with_read(|dataset| f(&StoreReader::new(dataset, index)))
    }

    /// Run `f` in a write transaction: committed if it returns Ok,
    /// discarded otherwise.
    pub fn write<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreWriter<'_>) -> StoreResult<T>,
    {
        let index = self.inner.text_index.as_ref();
        self.inner.tx_manager.with_write(|tx| {
            let mut writer = StoreWriter::new(tx, index);
            f(&mut writer)
        })
    }

    // Read side.

    pub fn get_description(&self, uri: &Iri) -> StoreResult<TypedDescription> {
        self.read(|r| r.get_description(uri))
    }

    pub fn get_current_version(&self, uri: &Iri) -> StoreResult<TypedDescription> {
        self.read(|r| r.get_current_version(uri))
    }

    pub fn get_version(&self, version_uri: &Iri, with_entity: bool) -> StoreResult<TypedDescription> {
        self.read(|r| r.get_version(version_uri, with_entity))
    }

    pub fn get_version_at(&self, uri: &Iri, at: DateTime<Utc>) -> StoreResult<Option<TypedDescription>> {
        self.read(|r| r.get_version_at(uri, at))
    }

    pub fn version_started_at(&self, version_uri: &Iri) -> Option<DateTime<Utc>> {
        self.read(|r| r.version_started_at(version_uri))
    }

    pub fn list_versions(&self, uri: &Iri) -> StoreResult<Vec<VersionInfo>> {
        self.read(|r| r.list_versions(uri))
    }

    pub fn get_item(&self, uri: &Iri, with_entity: bool) -> StoreResult<RegisterItem> {
        self.read(|r| r.get_item(uri, with_entity))
    }

    pub fn get_graph(&self, graph_uri: &Iri) -> Option<Graph> {
        self.read(|r| r.get_graph(graph_uri))
    }

    pub fn fetch_all(&self, uris: &[Iri], with_entity: bool) -> StoreResult<ItemBatch> {
        self.read(|r| r.fetch_all(uris, with_entity))
    }

    pub fn list_members(&self, register: &Iri, filters: &[FilterSpec]) -> StoreResult<Vec<RegisterEntryInfo>> {
        self.read(|r| {
            let register = r.get_current_version(register)?.into_register()?;
            r.list_members(&register, filters)
        })
    }

    pub fn list_members_with_status(
        &self,
        register: &Iri,
        filters: &[FilterSpec],
        status: Status,
    ) -> StoreResult<Vec<RegisterEntryInfo>> {
        self.read(|r| {
            let register = r.get_current_version(register)?.into_register()?;
            r.list_members_with_status(&register, filters, status)
        })
    }

    pub fn construct_view(&self, register: &Iri, options: &ViewOptions) -> StoreResult<RegisterView> {
        self.read(|r| {
            let register = r.get_current_version(register)?.into_register()?;
            r.construct_view(&register, options)
        })
    }

    pub fn contains(&self, register: &Iri, notation: &str) -> StoreResult<bool> {
        self.read(|r| {
            let register = r.get_current_version(register)?.into_register()?;
            r.contains(&register, notation)
        })
    }

    pub fn list_entity_occurrences(&self, entity: &Iri) -> StoreResult<Vec<EntityInfo>> {
        self.read(|r| r.list_entity_occurrences(entity))
    }

    pub fn list_delegations(&self) -> StoreResult<Vec<DelegationRecord>> {
        self.read(|r| r.list_delegations())
    }

    pub fn search(&self, request: &SearchRequest) -> StoreResult<Vec<Iri>> {
        self.read(|r| r.search(request))
    }

    pub fn export_tree(&self, uri: &Iri, sink: &mut dyn TreeSink) -> StoreResult<()> {
        self.read(|r| r.export_tree(uri, sink))
    }

    /// Ad hoc basic-graph-pattern query over the default graph.
    pub fn query(&self, query: &Query) -> Vec<Bindings> {
        self.read(|r| query.evaluate(r.dataset().default_graph()))
    }

    // Write side.

    pub fn add_to_register(&self, register: &Iri, item: RegisterItem, at: DateTime<Utc>) -> StoreResult<Iri> {
        self.write(|w| w.add_to_register(register, item, at))
    }

    pub fn update_item(&self, item: &mut RegisterItem, with_entity: bool, at: DateTime<Utc>) -> StoreResult<Iri> {
        self.write(|w| w.update_item(item, with_entity, at))
    }

    pub fn update_register(&self, register: &Register, at: DateTime<Utc>) -> StoreResult<Iri> {
        self.write(|w| w.update_register(register, at))
    }

    pub fn store_graph(&self, uri: Iri, graph: Graph) -> StoreResult<()> {
        self.write(|w| {
            w.store_graph(uri, graph);
            Ok(())
        })
    }

    pub fn delete(&self, uri: &Iri) -> StoreResult<()> {
        self.write(|w| w.delete(uri))
    }

    pub fn import_tree<R: BufRead>(&self, uri: &Iri, input: R) -> StoreResult<usize> {
        self.write(|w| w.import_tree(uri, input))
    }

    /// Initial population from an N-Quads definition.
    pub fn load_bootstrap<R: BufRead>(&self, input: R) -> StoreResult<usize> {
        let count = self.write(|w| w.insert_quads(input))?;
        info!(statements = count, "loaded bootstrap data");
        Ok(count)
    }

    /// Read the item, apply `f` and write the next version, all under the
    /// item's update lock. The new version starts at the time the lock
    /// was granted.
    pub fn update_item_with<F>(&self, uri: &Iri, with_entity: bool, f: F) -> StoreResult<Iri>
    where
        F: FnOnce(&mut RegisterItem) -> StoreResult<()>,
    {
        let _guard = self.lock(uri.as_str());
        self.locked_update(uri, with_entity, Utc::now(), f)
    }

    /// As [`Store::update_item_with`] with an explicit start time. Fails
    /// with `TimestampRegression` if `at` precedes the current version.
    pub fn update_item_with_at<F>(&self, uri: &Iri, with_entity: bool, at: DateTime<Utc>, f: F) -> StoreResult<Iri>
    where
        F: FnOnce(&mut RegisterItem) -> StoreResult<()>,
    {
        let _guard = self.lock(uri.as_str());
        self.locked_update(uri, with_entity, at, f)
    }

    fn locked_update<F>(&self, uri: &Iri, with_entity: bool, at: DateTime<Utc>, f: F) -> StoreResult<Iri>
    where
        F: FnOnce(&mut RegisterItem) -> StoreResult<()>,
    {
        let mut item = self.get_item(uri, with_entity)?;
        f(&mut item)?;
        self.update_item(&mut item, with_entity, at)
    }

    // Update locks.

    /// Take the update lock for `uri`; held until the guard drops.
    pub fn lock(&self, uri: &str) -> LockGuard {
        self.inner.locks.lock(uri)
    }

    /// Release a lock taken with [`LockTable::acquire`] through [`Store::locks`].
    pub fn unlock(&self, uri: &str) -> StoreResult<()> {
        self.inner
            .locks
            .release(uri)
            .map_err(|e| StoreError::internal(e.to_string()))
    }

    pub fn locks(&self) -> &LockTable {
        &self.inner.locks
    }

    pub fn stats(&self) -> StoreStats {
        let (statements, named_graphs) = self.read(|r| {
            let dataset = r.dataset();
            (dataset.default_graph().len(), dataset.graph_names().count())
        });
        StoreStats {
            statements,
            named_graphs,
            active_transactions: self.inner.tx_manager.active_count(),
            locks_held: self.inner.locks.held_count(),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.inner.config)
            .field("tx_manager", &self.inner.tx_manager)
            .field("locks", &self.inner.locks)
            .finish()
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Statements in the default graph.
    pub statements: usize,
    pub named_graphs: usize,
    pub active_transactions: usize,
    pub locks_held: usize,
}
