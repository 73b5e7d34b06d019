//! Read side of the registry store.
//!
//! A `StoreReader` works over one consistent dataset: a published snapshot
//! for plain reads, or the staged dataset inside a write transaction.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::{
    notation, Description, ModelError, Register, RegisterItem, RegisterView, Status,
    TypedDescription, ViewOptions,
};
use crate::rdf::vocab::{dct, owl, rdf, rdfs, reg, version as ver};
use crate::rdf::{Graph, Iri, Literal, Term, Triple};
use crate::storage::{Bindings, Dataset, Node, Query};
use crate::store::entry::{DelegationKind, DelegationRecord, EntityInfo, RegisterEntryInfo};
use crate::store::error::{StoreError, StoreResult};
use crate::store::export::TreeSink;
use crate::store::filter::{self, FilterSpec};
use crate::store::search::{SearchRequest, TextIndex};
use crate::version::{self, VersionInfo};

pub struct StoreReader<'a> {
    dataset: &'a Dataset,
    text_index: &'a dyn TextIndex,
}

impl<'a> StoreReader<'a> {
    pub fn new(dataset: &'a Dataset, text_index: &'a dyn TextIndex) -> Self {
        Self {
            dataset,
            text_index,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    fn graph(&self) -> &'a Graph {
        self.dataset.default_graph()
    }

    /// Direct statements of `uri` plus one level of blank-node structure.
    pub fn describe(&self, uri: &Iri) -> Graph {
        self.graph().closure(&Term::from(uri))
    }

    pub fn exists(&self, uri: &Iri) -> bool {
        self.graph().has_subject(&Term::from(uri))
    }

    pub fn get_description(&self, uri: &Iri) -> StoreResult<TypedDescription> {
        let graph = self.describe(uri);
        if graph.is_empty() {
            return Err(StoreError::not_found(uri));
        }
        Ok(Description::new(uri.clone(), graph).classify())
    }

    /// The root merged with its current version.
    pub fn get_current_version(&self, uri: &Iri) -> StoreResult<TypedDescription> {
        let mut graph = Graph::new();
        self.current_version_into(uri, &mut graph)?;
        Ok(Description::new(uri.clone(), graph).classify())
    }

    fn current_version_into(&self, uri: &Iri, dest: &mut Graph) -> StoreResult<()> {
        let root = Term::from(uri);
        if !self.graph().has_subject(&root) {
            return Err(StoreError::not_found(uri));
        }
        self.graph().copy_closure_into(&root, dest);
        if let Some(Term::Iri(current)) = self.graph().object(&root, &ver::CURRENT_VERSION) {
            self.graph().copy_closure_into(&Term::from(current), dest);
            version::flatten(dest, uri, current);
        }
        Ok(())
    }

    /// A specific version `root:n`, flattened onto its root.
    pub fn get_version(&self, version_uri: &Iri, with_entity: bool) -> StoreResult<TypedDescription> {
        let v = Term::from(version_uri);
        if !self.graph().has_subject(&v) {
            return Err(StoreError::not_found(version_uri));
        }
        let root = self
            .graph()
            .object(&v, &dct::IS_VERSION_OF)
            .and_then(Term::as_iri)
            .cloned()
            .ok_or_else(|| {
                StoreError::internal(format!("version {} has no dct:isVersionOf", version_uri))
            })?;
        let mut graph = self.graph().closure(&v);
        self.graph().copy_closure_into(&Term::from(&root), &mut graph);
        version::flatten(&mut graph, &root, version_uri);

        let mut typed = Description::new(root, graph).classify();
        if with_entity {
            if let TypedDescription::Item(item) = &mut typed {
                self.get_entity(item, false)?;
            }
        }
        Ok(typed)
    }

    /// The version in force at `at`: started at or before it, not yet ended.
    pub fn get_version_at(&self, uri: &Iri, at: DateTime<Utc>) -> StoreResult<Option<TypedDescription>> {
        match self.list_versions(uri)?.into_iter().find(|v| v.covers(at)) {
            Some(info) => self.get_version(&info.uri, false).map(Some),
            None => Ok(None),
        }
    }

    pub fn version_started_at(&self, version_uri: &Iri) -> Option<DateTime<Utc>> {
        version::interval_bounds(self.graph(), version_uri).0
    }

    /// Version history of `uri`, oldest first.
    pub fn list_versions(&self, uri: &Iri) -> StoreResult<Vec<VersionInfo>> {
        let root = Term::from(uri);
        if !self.graph().has_subject(&root) {
            return Err(StoreError::not_found(uri));
        }
        let mut versions: Vec<VersionInfo> = self
            .graph()
            .subjects_with(&dct::IS_VERSION_OF, &root)
            .iter()
            .filter_map(Term::as_iri)
            .map(|v| {
                let vt = Term::from(v);
                let ordinal = self
                    .graph()
                    .object(&vt, &owl::VERSION_INFO)
                    .and_then(Term::as_literal)
                    .and_then(Literal::as_i64)
                    .map(|n| n.max(0) as u64)
                    .or_else(|| version::split_versioned_uri(v).map(|(_, n)| n))
                    .unwrap_or(0);
                let (from, to) = version::interval_bounds(self.graph(), v);
                let replaces = self
                    .graph()
                    .object(&vt, &dct::REPLACES)
                    .and_then(Term::as_iri)
                    .cloned();
                VersionInfo {
                    uri: v.clone(),
                    version: ordinal,
                    from,
                    to,
                    replaces,
                }
            })
            .collect();
        versions.sort_by_key(|v| v.version);
        Ok(versions)
    }

    /// Copy of a named graph.
    pub fn get_graph(&self, graph_uri: &Iri) -> Option<Graph> {
        self.dataset.graph(graph_uri).cloned()
    }

    pub fn get_item(&self, uri: &Iri, with_entity: bool) -> StoreResult<RegisterItem> {
        let mut item = self.get_current_version(uri)?.into_item()?;
        if with_entity {
            self.get_entity(&mut item, true)?;
        }
        Ok(item)
    }

    /// Attach the item's entity. `current` selects the sub-register's
    /// current version rather than the version pinned by `reg:entityVersion`.
    pub fn get_entity(&self, item: &mut RegisterItem, current: bool) -> StoreResult<()> {
        let Some(entity) = item.entity_ref().cloned() else {
            warn!(item = ?item.uri(), "item has no entity reference");
            return Ok(());
        };
        if let Some(source) = item.source_graph().cloned() {
            let graph = match self.dataset.graph(&source) {
                Some(g) => g.clone(),
                None => {
                    warn!(graph = %source, "entity graph is missing");
                    Graph::new()
                }
            };
            item.set_entity(Description::new(entity, graph));
        } else if item.is_register() {
            let Term::Iri(entity_uri) = &entity else {
                return Err(ModelError::inconsistent(entity.lexical(), "register entity has no URI").into());
            };
            let desc = if current {
                self.get_current_version(entity_uri)?
            } else {
                let pinned = item.entity_version().cloned().ok_or_else(|| {
                    ModelError::inconsistent(entity_uri.as_str(), "sub-register item has no reg:entityVersion")
                })?;
                self.get_version(&pinned, false)?
            };
            item.set_entity(desc.into_description());
        } else {
            // an entity registered by reference lives in the default graph
            let graph = self.graph().closure(&entity);
            item.set_entity(Description::new(entity, graph));
        }
        Ok(())
    }

    /// Fetch many items into one shared graph.
    pub fn fetch_all(&self, uris: &[Iri], with_entity: bool) -> StoreResult<ItemBatch> {
        let mut graph = Graph::new();
        let mut entries = Vec::with_capacity(uris.len());
        for uri in uris {
            self.current_version_into(uri, &mut graph)?;
            let root = Term::from(uri);
            if !graph.contains(&root, &rdf::TYPE, &Term::from(reg::REGISTER_ITEM)) {
                return Err(StoreError::WrongType {
                    uri: uri.to_string(),
                    expected: "RegisterItem",
                });
            }
            let definition = graph.object(&root, &reg::DEFINITION).cloned();
            let entity = definition
                .as_ref()
                .and_then(|d| graph.object(d, &reg::ENTITY))
                .cloned();
            if with_entity {
                if let (Some(def), Some(e)) = (&definition, &entity) {
                    self.entity_into(def, e, &mut graph)?;
                }
            }
            entries.push(BatchEntry {
                item: uri.clone(),
                entity,
            });
        }
        debug!(items = entries.len(), statements = graph.len(), "fetched item batch");
        Ok(ItemBatch { graph, entries })
    }

    fn entity_into(&self, definition: &Term, entity: &Term, dest: &mut Graph) -> StoreResult<()> {
        let source = dest.object(definition, &reg::SOURCE_GRAPH).and_then(Term::as_iri).cloned();
        match (source, entity) {
            (Some(g), _) => {
                if let Some(content) = self.dataset.graph(&g) {
                    dest.extend(content);
                }
            }
            (None, Term::Iri(uri)) if self.graph().has_property(entity, &ver::CURRENT_VERSION) => {
                self.current_version_into(uri, dest)?;
            }
            (None, _) => self.graph().copy_closure_into(entity, dest),
        }
        Ok(())
    }

    /// Current members of a register, ordered by notation.
    pub fn list_members(&self, register: &Register, filters: &[FilterSpec]) -> StoreResult<Vec<RegisterEntryInfo>> {
        let register_uri = register.require_uri()?;
        let query = Query::new()
            .pattern(Node::var("item"), reg::REGISTER_PROP, register_uri)
            .pattern(Node::var("item"), ver::CURRENT_VERSION, Node::var("itemVer"))
            .pattern(Node::var("item"), reg::NOTATION, Node::var("notation"))
            .pattern(Node::var("itemVer"), reg::STATUS, Node::var("status"))
            .pattern(Node::var("itemVer"), reg::DEFINITION, Node::var("def"))
            .pattern(Node::var("def"), reg::ENTITY, Node::var("entity"));
        let query = filter::apply_all(query, filters, "entity").order_by("notation");

        let mut entries: Vec<RegisterEntryInfo> = Vec::new();
        let mut seen: BTreeSet<Iri> = BTreeSet::new();
        for row in query.evaluate(self.graph()) {
            let Some(entry) = self.entry_from_row(&row) else {
                warn!(register = %register_uri, row = ?row, "skipping ill-formed member");
                continue;
            };
            if seen.insert(entry.item.clone()) {
                entries.push(entry);
            }
        }
        debug!(register = %register_uri, members = entries.len(), "listed members");
        Ok(entries)
    }

    /// Members whose current status is (a specialization of) `status`.
    pub fn list_members_with_status(
        &self,
        register: &Register,
        filters: &[FilterSpec],
        status: Status,
    ) -> StoreResult<Vec<RegisterEntryInfo>> {
        let mut members = self.list_members(register, filters)?;
        members.retain(|m| m.status.is_a(status));
        Ok(members)
    }

    fn entry_from_row(&self, row: &Bindings) -> Option<RegisterEntryInfo> {
        let item = row.get("item")?.as_iri()?.clone();
        let item_ver = row.get("itemVer")?;
        let status = Status::from_term(row.get("status")?)?;
        Some(RegisterEntryInfo {
            labels: self
                .graph()
                .objects(item_ver, &rdfs::LABEL)
                .map(|l| l.lexical().to_string())
                .collect(),
            types: self
                .graph()
                .objects(&Term::from(&item), &reg::ITEM_CLASS)
                .filter_map(Term::as_iri)
                .cloned()
                .collect(),
            entity: row.get("entity")?.clone(),
            notation: row.get("notation")?.lexical().to_string(),
            status,
            item,
        })
    }

    fn entry_for_item(item: &RegisterItem) -> Option<RegisterEntryInfo> {
        let d = item.description();
        Some(RegisterEntryInfo {
            item: item.uri()?.clone(),
            entity: item.entity_ref()?.clone(),
            notation: item.notation()?.to_string(),
            status: item.status(),
            labels: d.values(&rdfs::LABEL).map(|l| l.lexical().to_string()).collect(),
            types: d.values(&reg::ITEM_CLASS).filter_map(Term::as_iri).cloned().collect(),
        })
    }

    /// True if the register has an item with this notation.
    pub fn contains(&self, register: &Register, notation: &str) -> StoreResult<bool> {
        let item = register.item_uri(notation)?;
        Ok(self
            .graph()
            .contains(&Term::from(item), &rdf::TYPE, &Term::from(reg::REGISTER_ITEM)))
    }

    /// Every current registration of an entity.
    pub fn list_entity_occurrences(&self, entity: &Iri) -> StoreResult<Vec<EntityInfo>> {
        let query = Query::new()
            .pattern(Node::var("def"), reg::ENTITY, entity)
            .pattern(Node::var("itemVer"), reg::DEFINITION, Node::var("def"))
            .pattern(Node::var("itemVer"), reg::STATUS, Node::var("status"))
            .pattern(Node::var("item"), ver::CURRENT_VERSION, Node::var("itemVer"))
            .pattern(Node::var("item"), reg::REGISTER_PROP, Node::var("register"))
            .order_by("item");
        let mut out = Vec::new();
        for row in query.evaluate(self.graph()) {
            let (Some(item), Some(register), Some(status)) = (
                row.get("item").and_then(Term::as_iri),
                row.get("register").and_then(Term::as_iri),
                row.get("status"),
            ) else {
                continue;
            };
            out.push(EntityInfo {
                entity: entity.clone(),
                item: item.clone(),
                register: register.clone(),
                status: Status::for_resource(status),
            });
        }
        Ok(out)
    }

    /// Delegation points registered by accepted items, ordered by record.
    ///
    /// A delegated register keeps its target on its current version, a
    /// plain `reg:Delegated` entity on itself.
    pub fn list_delegations(&self) -> StoreResult<Vec<DelegationRecord>> {
        let graph = self.graph();
        let query = Query::new()
            .pattern(Node::var("item"), ver::CURRENT_VERSION, Node::var("itemVer"))
            .pattern(Node::var("itemVer"), reg::STATUS, Node::var("status"))
            .pattern(Node::var("itemVer"), reg::DEFINITION, Node::var("def"))
            .pattern(Node::var("def"), reg::ENTITY, Node::var("record"))
            .order_by("record");

        let mut out: Vec<DelegationRecord> = Vec::new();
        for row in query.evaluate(graph) {
            let (Some(record), Some(status)) = (row.get("record"), row.get("status")) else {
                continue;
            };
            if !Status::for_resource(status).is_accepted() {
                continue;
            }
            let holder = if graph.contains(record, &rdf::TYPE, &Term::from(reg::DELEGATED_REGISTER)) {
                graph.object(record, &ver::CURRENT_VERSION)
            } else if graph.contains(record, &rdf::TYPE, &Term::from(reg::DELEGATED)) {
                Some(record)
            } else {
                None
            };
            let Some(holder) = holder else {
                continue;
            };
            if !graph.has_property(holder, &reg::DELEGATION_TARGET) {
                continue;
            }
            match self.delegation_record(record, holder) {
                Some(delegation) => {
                    if out.last().map_or(true, |last| last.record != delegation.record) {
                        out.push(delegation);
                    }
                }
                None => warn!(record = %record, "bad delegation record"),
            }
        }
        debug!(delegations = out.len(), "listed delegations");
        Ok(out)
    }

    fn delegation_record(&self, record: &Term, holder: &Term) -> Option<DelegationRecord> {
        let graph = self.graph();
        let is_a = |class: Iri| graph.contains(record, &rdf::TYPE, &Term::from(class));
        let kind = if is_a(reg::FEDERATED_REGISTER) {
            DelegationKind::Federate
        } else if is_a(reg::DELEGATED_REGISTER) {
            DelegationKind::Delegate
        } else {
            DelegationKind::Forward
        };
        let value = |property: &Iri| graph.object(holder, property);
        let target = value(&reg::DELEGATION_TARGET)?.as_iri()?.clone();

        let forwarding_code = match kind {
            DelegationKind::Delegate => None,
            _ => match value(&reg::FORWARDING_CODE) {
                Some(code) => Some(u16::try_from(code.as_literal()?.as_i64()?).ok()?),
                None => Some(DelegationRecord::DEFAULT_FORWARDING_CODE),
            },
        };
        let (subject, predicate, object) = match kind {
            DelegationKind::Delegate => (
                value(&reg::ENUMERATION_SUBJECT).and_then(Term::as_iri).cloned(),
                value(&reg::ENUMERATION_PREDICATE).and_then(Term::as_iri).cloned(),
                // a literal object counts only when it spells an IRI
                value(&reg::ENUMERATION_OBJECT).and_then(|o| match o {
                    Term::Iri(iri) => Some(iri.clone()),
                    Term::Literal(l) => Iri::new(l.lexical()).ok(),
                    Term::Blank(_) => None,
                }),
            ),
            _ => (None, None, None),
        };
        Some(DelegationRecord {
            record: record.as_iri()?.clone(),
            target,
            kind,
            forwarding_code,
            subject,
            predicate,
            object,
        })
    }

    /// Items matching a free-text query, ordered by URI.
    pub fn search(&self, request: &SearchRequest) -> StoreResult<Vec<Iri>> {
        let graph = self.graph();
        let hits = self.text_index.search(graph, &request.query);

        let mut candidates: BTreeSet<Term> = BTreeSet::new();
        for hit in hits {
            if request.include_versions {
                candidates.extend(graph.objects(&hit, &dct::IS_VERSION_OF).cloned());
            } else {
                candidates.extend(graph.subjects_with(&ver::CURRENT_VERSION, &hit));
            }
            candidates.insert(hit);
        }

        let mut items: BTreeSet<Iri> = BTreeSet::new();
        for candidate in &candidates {
            if graph.contains(candidate, &rdf::TYPE, &Term::from(reg::REGISTER_ITEM)) {
                if let Some(uri) = candidate.as_iri() {
                    items.insert(uri.clone());
                }
                continue;
            }
            let link = if request.include_versions {
                dct::IS_VERSION_OF
            } else {
                ver::CURRENT_VERSION
            };
            let query = Query::new()
                .pattern(Node::var("def"), reg::ENTITY, candidate.clone())
                .pattern(Node::var("itemVer"), reg::DEFINITION, Node::var("def"));
            for row in query.evaluate(graph) {
                let Some(item_ver) = row.get("itemVer") else {
                    continue;
                };
                let owners = if request.include_versions {
                    graph.objects(item_ver, &link).cloned().collect::<Vec<_>>()
                } else {
                    graph.subjects_with(&link, item_ver)
                };
                items.extend(owners.iter().filter_map(Term::as_iri).cloned());
            }
        }

        let filter_query = filter::apply_all(Query::new(), &request.filters, "entity");
        let mut matched = Vec::new();
        for uri in items {
            let item = self.get_item(&uri, false)?;
            if let Some(status) = request.status {
                if !item.status().is_a(status) {
                    continue;
                }
            }
            if !request.filters.is_empty() {
                let Some(entity) = item.entity_ref() else {
                    continue;
                };
                let mut initial = Bindings::new();
                initial.insert("entity".to_string(), entity.clone());
                if filter_query.evaluate_from(graph, initial).is_empty() {
                    continue;
                }
            }
            matched.push(uri);
        }
        debug!(query = %request.query, matches = matched.len(), "search");

        let limit = request.limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(request.offset).take(limit).collect())
    }

    /// Materialize a page of a register's members, see [`ViewOptions`].
    pub fn construct_view(&self, register: &Register, options: &ViewOptions) -> StoreResult<RegisterView> {
        let register_uri = register.require_uri()?;
        let register_term = Term::from(register_uri);

        let mut graph = register.description().graph().clone();
        let mut members = Vec::new();

        let selected: Vec<(RegisterEntryInfo, Option<RegisterItem>)> = match options.at {
            Some(at) => {
                let mut out = Vec::new();
                for current in self.list_members(register, &[])? {
                    let Some(TypedDescription::Item(mut item)) = self.get_version_at(&current.item, at)? else {
                        continue;
                    };
                    self.get_entity(&mut item, false)?;
                    if let Some(entry) = Self::entry_for_item(&item) {
                        out.push((entry, Some(item)));
                    }
                }
                out
            }
            None => self
                .list_members(register, &[])?
                .into_iter()
                .map(|e| (e, None))
                .collect(),
        };
        let selected: Vec<_> = selected
            .into_iter()
            .filter(|(entry, _)| entry.status.is_a(options.status))
            .collect();
        let total = selected.len();
        let limit = options.limit.unwrap_or(usize::MAX);
        let page: Vec<_> = selected.into_iter().skip(options.offset).take(limit).collect();
        let complete = options.offset.saturating_add(page.len()) >= total;

        let pending: Vec<Iri> = page
            .iter()
            .filter(|(_, item)| item.is_none())
            .map(|(entry, _)| entry.item.clone())
            .collect();
        if !pending.is_empty() {
            if options.with_metadata && !options.with_version {
                graph.extend(&self.fetch_all(&pending, true)?.graph);
            } else {
                for uri in &pending {
                    let item = self.get_item(uri, true)?;
                    if options.with_metadata {
                        // raw root and current version statements
                        graph.extend(&self.describe(uri));
                        if let Some(current) = self.graph().object(&Term::from(uri), &ver::CURRENT_VERSION).and_then(Term::as_iri) {
                            graph.extend(&self.describe(current));
                        }
                    }
                    if let Some(entity) = item.entity() {
                        graph.extend(entity.graph());
                    }
                }
            }
        }
        for (entry, item) in &page {
            if let Some(item) = item {
                if options.with_metadata {
                    graph.extend(item.description().graph());
                }
                if let Some(entity) = item.entity() {
                    graph.extend(entity.graph());
                }
            }
            register.membership().link(&mut graph, &register_term, &entry.entity);
            members.push(entry.entity.clone());
        }

        Ok(RegisterView {
            graph,
            members,
            complete,
        })
    }

    /// Stream an item (or a register with all its members) with every
    /// version and every named graph it references.
    pub fn export_tree(&self, uri: &Iri, sink: &mut dyn TreeSink) -> StoreResult<()> {
        let item_uri = notation::as_item_uri(uri).filter(|i| self.is_item(i));
        match item_uri {
            Some(item) => self.export_item(&item, sink)?,
            None => {
                // a register that is not itself registered, e.g. the root
                let register = self.get_current_version(uri)?.into_register()?;
                self.export_members(&register, sink)?;
                let mut graphs = BTreeSet::new();
                self.scan_all_versions(&Term::from(uri), sink, &mut graphs, None)?;
                self.emit_graphs(&graphs, sink)?;
            }
        }
        sink.finish()?;
        info!(uri = %uri, "exported tree");
        Ok(())
    }

    fn is_item(&self, uri: &Iri) -> bool {
        self.graph()
            .contains(&Term::from(uri), &rdf::TYPE, &Term::from(reg::REGISTER_ITEM))
    }

    fn export_item(&self, item_uri: &Iri, sink: &mut dyn TreeSink) -> StoreResult<()> {
        let item = self.get_item(item_uri, false)?;
        if item.is_register() {
            if let Some(Term::Iri(entity)) = item.entity_ref() {
                let register = self.get_current_version(entity)?.into_register()?;
                self.export_members(&register, sink)?;
            }
        }
        let mut graphs = BTreeSet::new();
        self.scan_all_versions(&Term::from(item_uri), sink, &mut graphs, None)?;
        self.emit_graphs(&graphs, sink)
    }

    fn export_members(&self, register: &Register, sink: &mut dyn TreeSink) -> StoreResult<()> {
        for member in self.list_members(register, &[])? {
            self.export_item(&member.item, sink)?;
        }
        Ok(())
    }

    fn emit_graphs(&self, graphs: &BTreeSet<Iri>, sink: &mut dyn TreeSink) -> StoreResult<()> {
        for name in graphs {
            if let Some(graph) = self.dataset.graph(name) {
                for triple in graph.triples() {
                    sink.quad(name, &triple)?;
                }
            }
        }
        Ok(())
    }

    /// Emit `root`, every version of it, and (unless `entities` collects
    /// them for the caller) every entity those versions define.
    ///
    /// Named graphs referenced along the way are added to `graphs`.
    pub(crate) fn scan_all_versions(
        &self,
        root: &Term,
        sink: &mut dyn TreeSink,
        graphs: &mut BTreeSet<Iri>,
        mut entities: Option<&mut BTreeSet<Term>>,
    ) -> StoreResult<()> {
        let graph = self.graph();
        self.emit_ref_closure(root, sink)?;
        for version in graph.subjects_with(&dct::IS_VERSION_OF, root) {
            self.emit_ref_closure(&version, sink)?;
            if let Some(interval) = graph.object(&version, &ver::INTERVAL) {
                self.emit_ref_closure(interval, sink)?;
            }
            for annotation in graph.objects(&version, &reg::ANNOTATION).filter_map(Term::as_iri) {
                graphs.insert(annotation.clone());
            }
            let Some(definition) = graph.object(&version, &reg::DEFINITION) else {
                continue;
            };
            if let Some(Term::Iri(source)) = graph.object(definition, &reg::SOURCE_GRAPH) {
                graphs.insert(source.clone());
            }
            if let Some(entity) = graph.object(definition, &reg::ENTITY) {
                match entities.as_deref_mut() {
                    Some(collected) => {
                        collected.insert(entity.clone());
                    }
                    None if entity != root => {
                        self.scan_all_versions(entity, sink, graphs, None)?;
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    fn emit_ref_closure(&self, node: &Term, sink: &mut dyn TreeSink) -> StoreResult<()> {
        let graph = self.graph();
        for (s, p) in graph.referencing(node) {
            sink.triple(&Triple::new(s.clone(), p.clone(), node.clone()))?;
        }
        for triple in graph.closure(node).triples() {
            sink.triple(&triple)?;
        }
        Ok(())
    }
}

/// Items fetched into one shared graph by [`StoreReader::fetch_all`].
#[derive(Debug, Clone)]
pub struct ItemBatch {
    pub graph: Graph,
    pub entries: Vec<BatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub item: Iri,
    pub entity: Option<Term>,
}

impl ItemBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detached view of one item, with its entity if it was fetched.
    pub fn item(&self, index: usize) -> Option<RegisterItem> {
        let entry = self.entries.get(index)?;
        let root = Term::from(&entry.item);
        let mut item = RegisterItem::new(Description::new(entry.item.clone(), self.graph.closure(&root)));
        if let Some(entity) = &entry.entity {
            if self.graph.has_subject(entity) {
                item.set_entity(Description::new(entity.clone(), self.graph.closure(entity)));
            }
        }
        Some(item)
    }
}
