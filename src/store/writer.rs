//! Write side of the registry store.
//!
//! Every update goes through [`StoreWriter::do_update`], which turns a
//! flattened description into the next version of its root:
//!
//! ```text
//!   <item> reg:register, reg:notation, ...      rigid, stay on the root
//!   <item> version:currentVersion <item:N+1>
//!   <item:N+1> owl:versionInfo N+1 ; dct:isVersionOf <item> ;
//!              dct:replaces <item:N> ; version:interval <item:N+1#interval>
//!   <item:N#interval> time:hasEnd [ ... ]       closes the old version
//! ```
//!
//! Older versions are never rewritten apart from closing their interval.

use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::core::item::{rigid_properties, IDENTITY_PROPERTIES};
use crate::core::{notation, Description, Register, RegisterItem};
use crate::rdf::vocab::{dct, owl, rdf, reg, version as ver};
use crate::rdf::{nquads, BlankNode, Graph, Iri, Literal, Term};
use crate::storage::Dataset;
use crate::store::error::{StoreError, StoreResult};
use crate::store::export::DatasetSink;
use crate::store::reader::StoreReader;
use crate::store::search::TextIndex;
use crate::transaction::{Transaction, TxActive};
use crate::version::{self, RigidProperties};

pub struct StoreWriter<'a> {
    tx: &'a mut Transaction<TxActive>,
    text_index: &'a dyn TextIndex,
}

impl<'a> StoreWriter<'a> {
    pub fn new(tx: &'a mut Transaction<TxActive>, text_index: &'a dyn TextIndex) -> Self {
        Self { tx, text_index }
    }

    /// Reads see this transaction's own staged changes.
    pub fn reader(&self) -> StoreReader<'_> {
        StoreReader::new(self.tx.dataset(), self.text_index)
    }

    fn graph(&self) -> &Graph {
        self.tx.default_graph()
    }

    /// Replace a named graph.
    pub fn store_graph(&mut self, uri: Iri, graph: Graph) {
        debug!(graph = %uri, statements = graph.len(), "storing graph");
        self.tx.dataset_mut().insert_graph(uri, graph);
    }

    /// Add raw statements to the default graph.
    pub fn add_all(&mut self, graph: &Graph) {
        self.tx.default_graph_mut().extend(graph);
    }

    /// Load N-Quads. Returns the number of statements read.
    ///
    /// Blank node labels are local to `input`: every label gets a fresh
    /// node, so two documents that both say `_:b` never share a node.
    pub fn insert_quads<R: BufRead>(&mut self, input: R) -> StoreResult<usize> {
        let dataset = self.tx.dataset_mut();
        let mut scope = HashMap::new();
        let count = nquads::read_quads(input, |mut quad| {
            quad.triple.subject = rescope(quad.triple.subject, &mut scope);
            quad.triple.object = rescope(quad.triple.object, &mut scope);
            dataset.insert_quad(quad);
            Ok(())
        })?;
        Ok(count)
    }

    /// Write `source` (a flattened description of `root`) as the next
    /// version of `root`. Returns the new version's URI.
    pub fn do_update(
        &mut self,
        source: &Graph,
        root: &Iri,
        at: DateTime<Utc>,
        rigid: &RigidProperties,
    ) -> StoreResult<Iri> {
        let root_t = Term::from(root);
        let mut source = source.clone();
        {
            let stored = self.graph();
            for property in IDENTITY_PROPERTIES.iter() {
                let before: BTreeSet<&Term> = stored.objects(&root_t, property).collect();
                let after: BTreeSet<&Term> = source.objects(&root_t, property).collect();
                if !before.is_empty() && !after.is_empty() && before != after {
                    return Err(StoreError::RigidPropertyChange {
                        uri: root.to_string(),
                        property: property.to_string(),
                    });
                }
            }
            let mut carried = Graph::new();
            for property in rigid.iter() {
                if source.has_property(&root_t, property) {
                    continue;
                }
                for value in stored.objects(&root_t, property) {
                    carried.insert(root_t.clone(), property.clone(), value.clone());
                    if value.is_blank() {
                        stored.copy_closure_into(value, &mut carried);
                    }
                }
            }
            source.extend(&carried);

            // intervals of one chain never overlap
            let current_start = stored
                .object(&root_t, &ver::CURRENT_VERSION)
                .and_then(Term::as_iri)
                .and_then(|current| version::interval_bounds(stored, current).0);
            if let Some(current) = current_start.filter(|start| at < *start) {
                return Err(StoreError::TimestampRegression {
                    uri: root.to_string(),
                    at,
                    current,
                });
            }

            // the stored chain decides the ordinal, not the caller
            source.remove_all(&root_t, &owl::VERSION_INFO);
            let counter = version::version_counter(stored, root);
            if counter > 0 {
                source.insert(root_t.clone(), owl::VERSION_INFO, Literal::integer(counter as i64));
            }
        }

        let next = version::next_version(&source, root, at, rigid);

        let graph = self.tx.default_graph_mut();
        for (_, value) in graph.remove_subject(&root_t) {
            if value.is_blank() && !graph.is_referenced(&value) {
                graph.remove_subject(&value);
            }
        }
        graph.extend(&next.graph);
        debug!(root = %root, version = %next.version, "new version");
        Ok(next.version)
    }

    /// Register a new item (and its entity) in `register`.
    pub fn add_to_register(&mut self, register: &Iri, mut item: RegisterItem, at: DateTime<Utc>) -> StoreResult<Iri> {
        let item_uri = item.require_uri()?.clone();
        if self.graph().has_subject(&Term::from(&item_uri)) {
            return Err(StoreError::Conflict {
                uri: item_uri.to_string(),
            });
        }
        // fails with NotFound or WrongType before anything is written
        self.reader().get_current_version(register)?.into_register()?;

        item.description_mut()
            .set_property(reg::REGISTER_PROP, register.clone());
        self.do_update_item(&mut item, true, at)?;

        let subregister = item
            .entity()
            .filter(|e| e.has_type(&reg::REGISTER))
            .and_then(|e| e.uri().cloned());
        if let Some(sub) = subregister {
            let register_t = Term::from(register);
            let target = self
                .graph()
                .object(&register_t, &ver::CURRENT_VERSION)
                .cloned()
                .unwrap_or(register_t);
            self.tx
                .default_graph_mut()
                .insert(target, reg::SUBREGISTER, sub);
        }
        info!(register = %register, item = %item_uri, "added item");
        Ok(item_uri)
    }

    /// New version of an existing item. With `with_entity` the attached
    /// entity is stored as well.
    pub fn update_item(&mut self, item: &mut RegisterItem, with_entity: bool, at: DateTime<Utc>) -> StoreResult<Iri> {
        let uri = item.require_uri()?.clone();
        if !self.graph().has_subject(&Term::from(&uri)) {
            return Err(StoreError::not_found(&uri));
        }
        let version = self.do_update_item(item, with_entity, at)?;
        info!(item = %uri, version = %version, "updated item");
        Ok(version)
    }

    /// New version of a register's own description.
    pub fn update_register(&mut self, register: &Register, at: DateTime<Utc>) -> StoreResult<Iri> {
        let uri = register.require_uri()?.clone();
        if !self.graph().has_subject(&Term::from(&uri)) {
            return Err(StoreError::not_found(&uri));
        }
        let version = self.do_update_register(register.description(), at)?;
        info!(register = %uri, version = %version, "updated register");
        Ok(version)
    }

    fn do_update_register(&mut self, description: &Description, at: DateTime<Utc>) -> StoreResult<Iri> {
        let uri = description.require_uri()?.clone();
        let root = Term::from(&uri);
        let mut graph = description.graph().clone();
        graph.remove_all(&root, &reg::SUBREGISTER);
        if self.graph().has_subject(&root) {
            // sub-registers are maintained by add_to_register, not by callers
            let current = self.reader().get_current_version(&uri)?.into_description();
            for sub in current.values(&reg::SUBREGISTER) {
                graph.insert(root.clone(), reg::SUBREGISTER, sub.clone());
            }
        }
        graph.set(&root, dct::MODIFIED, Literal::date_time(at));
        self.do_update(&graph, &uri, at, &RigidProperties::type_only())
    }

    fn do_update_item(&mut self, item: &mut RegisterItem, with_entity: bool, at: DateTime<Utc>) -> StoreResult<Iri> {
        let item_uri = item.require_uri()?.clone();
        let item_t = Term::from(&item_uri);

        if with_entity {
            if let Some(entity) = item.entity().cloned() {
                let definition = {
                    let graph = item.description_mut().graph_mut();
                    let def = graph
                        .object(&item_t, &reg::DEFINITION)
                        .cloned()
                        .unwrap_or_else(|| Term::Blank(BlankNode::fresh()));
                    graph.set(&item_t, reg::DEFINITION, def.clone());
                    graph.set(&def, reg::ENTITY, entity.root().clone());
                    graph.remove_all(&def, &reg::SOURCE_GRAPH);
                    graph.remove_all(&def, &reg::ENTITY_VERSION);
                    def
                };

                if entity.has_type(&reg::REGISTER) && entity.uri().is_some() {
                    let version = self.do_update_register(&entity, at)?;
                    item.description_mut()
                        .graph_mut()
                        .set(&definition, reg::ENTITY_VERSION, version);
                } else {
                    let next = version::versioned_uri(&item_uri, version::version_counter(self.graph(), &item_uri) + 1);
                    let graph_uri = version::graph_uri(&next);
                    self.retract_previous_graph(&item_t);

                    let content = if entity.graph().instances_of(&Term::from(reg::REGISTER_ITEM)).next().is_some() {
                        entity.graph().deep_closure(entity.root())
                    } else {
                        entity.graph().clone()
                    };
                    if !item.is_graph() {
                        self.tx.default_graph_mut().extend(&content);
                    }
                    self.store_graph(graph_uri.clone(), content);
                    item.description_mut()
                        .graph_mut()
                        .set(&definition, reg::SOURCE_GRAPH, graph_uri);
                }
            }
        }

        let version = self.do_update(item.description().graph(), &item_uri, at, &rigid_properties())?;
        Ok(version)
    }

    /// Drop the entity graph of the item's current version, with the
    /// mirrored statements no other graph still asserts.
    fn retract_previous_graph(&mut self, item: &Term) {
        let graph = self.graph();
        let previous = graph
            .object(item, &ver::CURRENT_VERSION)
            .and_then(|v| graph.object(v, &reg::DEFINITION))
            .and_then(|d| graph.object(d, &reg::SOURCE_GRAPH))
            .and_then(Term::as_iri)
            .cloned();
        if let Some(previous) = previous {
            if !self.tx.dataset().contains_graph(&previous) {
                error!(graph = %previous, "previous entity graph is missing");
                return;
            }
            remove_graph_mirrored(self.tx.dataset_mut(), &previous);
        }
    }

    /// Delete an item (or a register with all its members) with its whole
    /// history. Entities are removed once no other item defines them.
    pub fn delete(&mut self, uri: &Iri) -> StoreResult<()> {
        let item = notation::as_item_uri(uri).filter(|i| {
            self.graph()
                .contains(&Term::from(i), &rdf::TYPE, &Term::from(reg::REGISTER_ITEM))
        });
        match item {
            Some(item) => self.delete_item(&item)?,
            None => {
                let register = self.reader().get_current_version(uri)?.into_register()?;
                self.delete_members(&register)?;
                self.delete_root(&Term::from(uri))?;
            }
        }
        info!(uri = %uri, "deleted");
        Ok(())
    }

    fn delete_item(&mut self, item_uri: &Iri) -> StoreResult<()> {
        let item = self.reader().get_item(item_uri, false)?;
        if item.is_register() {
            if let Some(Term::Iri(entity)) = item.entity_ref() {
                let register = self.reader().get_current_version(entity)?.into_register()?;
                self.delete_members(&register)?;
            }
        }
        self.delete_root(&Term::from(item_uri))
    }

    fn delete_members(&mut self, register: &Register) -> StoreResult<()> {
        let members = self.reader().list_members(register, &[])?;
        for member in members {
            self.delete_item(&member.item)?;
        }
        Ok(())
    }

    fn delete_root(&mut self, root: &Term) -> StoreResult<()> {
        let mut entities = BTreeSet::new();
        self.remove_scanned(root, Some(&mut entities))?;
        for entity in entities {
            if self.graph().subjects_with(&reg::ENTITY, &entity).is_empty() {
                self.remove_scanned(&entity, None)?;
            } else {
                debug!(entity = ?entity, "entity still referenced, kept");
            }
        }
        Ok(())
    }

    fn remove_scanned(&mut self, root: &Term, entities: Option<&mut BTreeSet<Term>>) -> StoreResult<()> {
        let mut sink = DatasetSink::new();
        let mut graphs = BTreeSet::new();
        self.reader().scan_all_versions(root, &mut sink, &mut graphs, entities)?;
        let dataset = self.tx.dataset_mut();
        dataset.default_graph_mut().subtract(sink.dataset().default_graph());
        for name in &graphs {
            remove_graph_mirrored(dataset, name);
        }
        Ok(())
    }

    /// Replace whatever is stored under `uri` with an exported tree.
    pub fn import_tree<R: BufRead>(&mut self, uri: &Iri, input: R) -> StoreResult<usize> {
        let present = notation::as_item_uri(uri)
            .is_some_and(|i| self.graph().has_subject(&Term::from(&i)))
            || self.graph().has_subject(&Term::from(uri));
        if present {
            self.delete(uri)?;
        }
        let count = self.insert_quads(input)?;
        info!(uri = %uri, statements = count, "imported tree");
        Ok(count)
    }
}

fn rescope(term: Term, scope: &mut HashMap<BlankNode, BlankNode>) -> Term {
    match term {
        Term::Blank(label) => Term::Blank(scope.entry(label).or_insert_with(BlankNode::fresh).clone()),
        other => other,
    }
}

/// Remove a named graph and the default-graph copies of its statements
/// that no other named graph asserts.
fn remove_graph_mirrored(dataset: &mut Dataset, name: &Iri) {
    let Some(graph) = dataset.graph(name) else {
        return;
    };
    let retract: Vec<_> = graph
        .triples()
        .into_iter()
        .filter(|t| !dataset.in_other_named_graph(Some(name), t))
        .collect();
    let default = dataset.default_graph_mut();
    for triple in &retract {
        default.remove_triple(triple);
    }
    dataset.remove_graph(name);
}
