//! A default graph plus any number of named graphs.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::rdf::nquads::{self, QuadWriter};
use crate::rdf::{Graph, Iri, Quad, RdfResult, Triple};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    default: Graph,
    named: BTreeMap<Iri, Graph>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_graph(&self) -> &Graph {
        &self.default
    }

    pub fn default_graph_mut(&mut self) -> &mut Graph {
        &mut self.default
    }

    pub fn graph(&self, name: &Iri) -> Option<&Graph> {
        self.named.get(name)
    }

    pub fn contains_graph(&self, name: &Iri) -> bool {
        self.named.contains_key(name)
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &Iri> {
        self.named.keys()
    }

    pub fn named_graphs(&self) -> impl Iterator<Item = (&Iri, &Graph)> {
        self.named.iter()
    }

    /// Store a named graph, replacing any previous content under that name.
    pub fn insert_graph(&mut self, name: Iri, graph: Graph) -> Option<Graph> {
        self.named.insert(name, graph)
    }

    pub fn remove_graph(&mut self, name: &Iri) -> Option<Graph> {
        self.named.remove(name)
    }

    pub fn insert_quad(&mut self, quad: Quad) -> bool {
        match quad.graph {
            None => self.default.insert_triple(quad.triple),
            Some(name) => self.named.entry(name).or_default().insert_triple(quad.triple),
        }
    }

    /// Total statement count over all graphs.
    pub fn len(&self) -> usize {
        self.default.len() + self.named.values().map(Graph::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if any named graph other than `except` contains the statement.
    pub fn in_other_named_graph(&self, except: Option<&Iri>, triple: &Triple) -> bool {
        self.named.iter().any(|(name, g)| {
            Some(name) != except && g.contains(&triple.subject, &triple.predicate, &triple.object)
        })
    }

    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        let default = self
            .default
            .triples()
            .into_iter()
            .map(|t| Quad::new(None, t));
        let named = self.named.iter().flat_map(|(name, g)| {
            g.triples()
                .into_iter()
                .map(move |t| Quad::new(Some(name.clone()), t))
        });
        default.chain(named)
    }

    pub fn read_nquads<R: Read>(reader: R) -> RdfResult<Self> {
        let mut ds = Dataset::new();
        nquads::read_quads(reader, |q| {
            ds.insert_quad(q);
            Ok(())
        })?;
        Ok(ds)
    }

    pub fn write_nquads<W: Write>(&self, w: &mut W) -> RdfResult<usize> {
        let mut out = QuadWriter::new(w);
        for (s, p, o) in self.default.iter() {
            out.write(None, &Triple::new(s.clone(), p.clone(), o.clone()))?;
        }
        for (name, g) in &self.named {
            for (s, p, o) in g.iter() {
                out.write(Some(name), &Triple::new(s.clone(), p.clone(), o.clone()))?;
            }
        }
        let count = out.count();
        out.finish();
        Ok(count)
    }
}
