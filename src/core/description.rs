//! Typed views over a resource closure.

use chrono::{DateTime, Utc};

use crate::core::error::{ModelError, ModelResult};
use crate::core::item::RegisterItem;
use crate::core::register::Register;
use crate::rdf::vocab::{owl, rdf, reg, version};
use crate::rdf::{Graph, Iri, Literal, Term};

/// A resource plus the in-memory graph describing it.
///
/// The graph is a detached copy: mutating it never touches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    root: Term,
    graph: Graph,
}

impl Description {
    pub fn new(root: impl Into<Term>, graph: Graph) -> Self {
        Self {
            root: root.into(),
            graph,
        }
    }

    pub fn root(&self) -> &Term {
        &self.root
    }

    pub fn uri(&self) -> Option<&Iri> {
        self.root.as_iri()
    }

    /// The root URI, or an error for blank-node roots.
    pub fn require_uri(&self) -> ModelResult<&Iri> {
        self.uri()
            .ok_or_else(|| ModelError::inconsistent(self.root.to_string(), "resource has no URI"))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Move the resource to a new identity, rewriting every reference.
    pub fn relocate(&mut self, to: Iri) {
        let to = Term::Iri(to);
        self.graph.rename(&self.root, &to);
        self.root = to;
    }

    pub fn types(&self) -> impl Iterator<Item = &Term> {
        self.graph.objects(&self.root, &rdf::TYPE)
    }

    pub fn has_type(&self, class: &Iri) -> bool {
        self.graph
            .contains(&self.root, &rdf::TYPE, &Term::from(class))
    }

    pub fn value(&self, property: &Iri) -> Option<&Term> {
        self.graph.object(&self.root, property)
    }

    pub fn values<'a>(&'a self, property: &Iri) -> impl Iterator<Item = &'a Term> + 'a {
        self.graph.objects(&self.root, property)
    }

    pub fn has_property(&self, property: &Iri) -> bool {
        self.graph.has_property(&self.root, property)
    }

    /// Lexical form of the first value.
    pub fn lexical_value(&self, property: &Iri) -> Option<&str> {
        self.value(property).map(Term::lexical)
    }

    pub fn set_property(&mut self, property: Iri, value: impl Into<Term>) {
        self.graph.set(&self.root, property, value);
    }

    pub fn add_property(&mut self, property: Iri, value: impl Into<Term>) {
        self.graph.insert(self.root.clone(), property, value);
    }

    pub fn remove_property(&mut self, property: &Iri) -> Vec<Term> {
        self.graph.remove_all(&self.root, property)
    }

    pub fn set_timestamp(&mut self, property: Iri, at: DateTime<Utc>) {
        self.set_property(property, Literal::date_time(at));
    }

    /// `owl:versionInfo` as seen in a flattened view, 0 if unversioned.
    pub fn version_number(&self) -> u64 {
        self.value(&owl::VERSION_INFO)
            .and_then(Term::as_literal)
            .and_then(Literal::as_i64)
            .map_or(0, |n| n.max(0) as u64)
    }

    pub fn current_version(&self) -> Option<&Iri> {
        self.value(&version::CURRENT_VERSION).and_then(Term::as_iri)
    }

    pub fn kind(&self) -> DescriptionKind {
        if self.has_type(&reg::REGISTER) {
            DescriptionKind::Register
        } else if self.has_type(&reg::REGISTER_ITEM) {
            DescriptionKind::RegisterItem
        } else {
            DescriptionKind::Plain
        }
    }

    /// Wrap in the most specific view for the root's type.
    pub fn classify(self) -> TypedDescription {
        match self.kind() {
            DescriptionKind::Register => TypedDescription::Register(Register::new(self)),
            DescriptionKind::RegisterItem => TypedDescription::Item(RegisterItem::new(self)),
            DescriptionKind::Plain => TypedDescription::Plain(self),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    Register,
    RegisterItem,
    Plain,
}

/// A description resolved by `rdf:type`.
#[derive(Debug, Clone)]
pub enum TypedDescription {
    Register(Register),
    Item(RegisterItem),
    Plain(Description),
}

impl TypedDescription {
    pub fn description(&self) -> &Description {
        match self {
            TypedDescription::Register(r) => r.description(),
            TypedDescription::Item(i) => i.description(),
            TypedDescription::Plain(d) => d,
        }
    }

    pub fn into_description(self) -> Description {
        match self {
            TypedDescription::Register(r) => r.into_description(),
            TypedDescription::Item(i) => i.into_description(),
            TypedDescription::Plain(d) => d,
        }
    }

    pub fn kind(&self) -> DescriptionKind {
        match self {
            TypedDescription::Register(_) => DescriptionKind::Register,
            TypedDescription::Item(_) => DescriptionKind::RegisterItem,
            TypedDescription::Plain(_) => DescriptionKind::Plain,
        }
    }

    pub fn into_register(self) -> ModelResult<Register> {
        match self {
            TypedDescription::Register(r) => Ok(r),
            other => Err(ModelError::WrongType {
                uri: other.description().root().lexical().to_string(),
                expected: "Register",
            }),
        }
    }

    pub fn into_item(self) -> ModelResult<RegisterItem> {
        match self {
            TypedDescription::Item(i) => Ok(i),
            other => Err(ModelError::WrongType {
                uri: other.description().root().lexical().to_string(),
                expected: "RegisterItem",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::rdfs;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_classify() {
        let mut g = Graph::new();
        g.insert(iri("http://example.com/reg1"), rdf::TYPE, reg::REGISTER);
        let d = Description::new(iri("http://example.com/reg1"), g);
        assert_eq!(d.kind(), DescriptionKind::Register);
        assert!(d.classify().into_register().is_ok());

        let plain = Description::new(iri("http://example.com/x"), Graph::new());
        let err = plain.classify().into_item().unwrap_err();
        assert!(matches!(err, ModelError::WrongType { expected: "RegisterItem", .. }));
    }

    #[test]
    fn test_relocate_rewrites_references() {
        let mut g = Graph::new();
        let b = Term::Blank(crate::rdf::BlankNode::new("e").unwrap());
        g.insert(b.clone(), rdfs::LABEL, Literal::string("red"));
        g.insert(iri("http://example.com/other"), rdfs::MEMBER, b.clone());
        let mut d = Description::new(b, g);
        d.relocate(iri("http://example.com/reg1/red"));
        assert_eq!(d.uri(), Some(&iri("http://example.com/reg1/red")));
        assert_eq!(d.lexical_value(&rdfs::LABEL), Some("red"));
        assert!(d.graph().contains(
            &Term::from(iri("http://example.com/other")),
            &rdfs::MEMBER,
            &Term::from(iri("http://example.com/reg1/red"))
        ));
    }
}
