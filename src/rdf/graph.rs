//! In-memory triple set.
//!
//! ```text
//!   spo: subject ──> predicate ──> {object}
//!   ops: object  ──> {(subject, predicate)}
//! ```
//!
//! Both indexes are ordered, so every iteration over a graph is
//! deterministic. That keeps exports and listings stable between runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::rdf::term::{Iri, Term, Triple};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    spo: BTreeMap<Term, BTreeMap<Iri, BTreeSet<Term>>>,
    ops: BTreeMap<Term, BTreeSet<(Term, Iri)>>,
    len: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a statement, returning false if it was already present.
    pub fn insert(&mut self, subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> bool {
        let subject = subject.into();
        let object = object.into();
        let added = self
            .spo
            .entry(subject.clone())
            .or_default()
            .entry(predicate.clone())
            .or_default()
            .insert(object.clone());
        if added {
            self.ops
                .entry(object)
                .or_default()
                .insert((subject, predicate));
            self.len += 1;
        }
        added
    }

    pub fn insert_triple(&mut self, triple: Triple) -> bool {
        self.insert(triple.subject, triple.predicate, triple.object)
    }

    pub fn remove(&mut self, subject: &Term, predicate: &Iri, object: &Term) -> bool {
        let Some(by_predicate) = self.spo.get_mut(subject) else {
            return false;
        };
        let Some(objects) = by_predicate.get_mut(predicate) else {
            return false;
        };
        if !objects.remove(object) {
            return false;
        }
        if objects.is_empty() {
            by_predicate.remove(predicate);
        }
        if by_predicate.is_empty() {
            self.spo.remove(subject);
        }
        if let Some(refs) = self.ops.get_mut(object) {
            refs.remove(&(subject.clone(), predicate.clone()));
            if refs.is_empty() {
                self.ops.remove(object);
            }
        }
        self.len -= 1;
        true
    }

    pub fn remove_triple(&mut self, triple: &Triple) -> bool {
        self.remove(&triple.subject, &triple.predicate, &triple.object)
    }

    pub fn contains(&self, subject: &Term, predicate: &Iri, object: &Term) -> bool {
        self.spo
            .get(subject)
            .and_then(|p| p.get(predicate))
            .is_some_and(|o| o.contains(object))
    }

    /// True if the term appears as a subject.
    pub fn has_subject(&self, subject: &Term) -> bool {
        self.spo.contains_key(subject)
    }

    pub fn has_property(&self, subject: &Term, predicate: &Iri) -> bool {
        self.spo
            .get(subject)
            .is_some_and(|p| p.contains_key(predicate))
    }

    pub fn objects<'a>(&'a self, subject: &Term, predicate: &Iri) -> impl Iterator<Item = &'a Term> + 'a {
        self.spo
            .get(subject)
            .and_then(|p| p.get(predicate))
            .into_iter()
            .flatten()
    }

    /// First object of a property, in term order.
    pub fn object(&self, subject: &Term, predicate: &Iri) -> Option<&Term> {
        self.objects(subject, predicate).next()
    }

    /// All (predicate, object) pairs of a subject.
    pub fn properties<'a>(&'a self, subject: &Term) -> impl Iterator<Item = (&'a Iri, &'a Term)> + 'a {
        self.spo
            .get(subject)
            .into_iter()
            .flat_map(|p| p.iter().flat_map(|(pred, objs)| objs.iter().map(move |o| (pred, o))))
    }

    /// Subjects `s` with `s predicate object`.
    pub fn subjects_with(&self, predicate: &Iri, object: &Term) -> Vec<Term> {
        self.ops
            .get(object)
            .into_iter()
            .flatten()
            .filter(|(_, p)| p == predicate)
            .map(|(s, _)| s.clone())
            .collect()
    }

    /// Every (subject, predicate) pointing at `object`.
    pub fn referencing<'a>(&'a self, object: &Term) -> impl Iterator<Item = (&'a Term, &'a Iri)> + 'a {
        self.ops.get(object).into_iter().flatten().map(|(s, p)| (s, p))
    }

    pub fn is_referenced(&self, object: &Term) -> bool {
        self.ops.contains_key(object)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Term> {
        self.spo.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Iri, &Term)> {
        self.spo.iter().flat_map(|(s, by_p)| {
            by_p.iter()
                .flat_map(move |(p, objs)| objs.iter().map(move |o| (s, p, o)))
        })
    }

    pub fn triples(&self) -> Vec<Triple> {
        self.iter()
            .map(|(s, p, o)| Triple::new(s.clone(), p.clone(), o.clone()))
            .collect()
    }

    /// Pattern match; `None` is a wildcard.
    pub fn matching(&self, subject: Option<&Term>, predicate: Option<&Iri>, object: Option<&Term>) -> Vec<Triple> {
        let mut out = Vec::new();
        let mut push = |s: &Term, p: &Iri, o: &Term| {
            if predicate.map_or(true, |want| want == p) && object.map_or(true, |want| want == o) {
                out.push(Triple::new(s.clone(), p.clone(), o.clone()));
            }
        };
        match (subject, object) {
            (Some(s), _) => {
                for (p, o) in self.properties(s) {
                    push(s, p, o);
                }
            }
            (None, Some(o)) => {
                for (s, p) in self.referencing(o) {
                    push(s, p, o);
                }
            }
            (None, None) => {
                for (s, p, o) in self.iter() {
                    push(s, p, o);
                }
            }
        }
        out
    }

    /// Remove every value of a property, returning the removed objects.
    pub fn remove_all(&mut self, subject: &Term, predicate: &Iri) -> Vec<Term> {
        let objects: Vec<Term> = self.objects(subject, predicate).cloned().collect();
        for o in &objects {
            self.remove(subject, predicate, o);
        }
        objects
    }

    /// Replace all values of a property with a single value.
    pub fn set(&mut self, subject: &Term, predicate: Iri, object: impl Into<Term>) {
        self.remove_all(subject, &predicate);
        self.insert(subject.clone(), predicate, object);
    }

    /// Remove every statement with the given subject.
    pub fn remove_subject(&mut self, subject: &Term) -> Vec<(Iri, Term)> {
        let props: Vec<(Iri, Term)> = self
            .properties(subject)
            .map(|(p, o)| (p.clone(), o.clone()))
            .collect();
        for (p, o) in &props {
            self.remove(subject, p, o);
        }
        props
    }

    pub fn extend(&mut self, other: &Graph) {
        for (s, p, o) in other.iter() {
            self.insert(s.clone(), p.clone(), o.clone());
        }
    }

    pub fn subtract(&mut self, other: &Graph) {
        for (s, p, o) in other.iter() {
            self.remove(s, p, o);
        }
    }

    /// Statements about `root` plus, one level deep, statements about any
    /// blank node it points at.
    pub fn closure(&self, root: &Term) -> Graph {
        let mut out = Graph::new();
        self.copy_closure_into(root, &mut out);
        out
    }

    pub fn copy_closure_into(&self, root: &Term, dest: &mut Graph) {
        for (p, o) in self.properties(root) {
            dest.insert(root.clone(), p.clone(), o.clone());
            if o.is_blank() && o != root {
                for (bp, bo) in self.properties(o) {
                    dest.insert(o.clone(), bp.clone(), bo.clone());
                }
            }
        }
    }

    /// Like [`Graph::closure`] but follows blank nodes to any depth.
    pub fn deep_closure(&self, root: &Term) -> Graph {
        let mut out = Graph::new();
        let mut seen = BTreeSet::new();
        let mut pending = vec![root.clone()];
        while let Some(node) = pending.pop() {
            if !seen.insert(node.clone()) {
                continue;
            }
            for (p, o) in self.properties(&node) {
                out.insert(node.clone(), p.clone(), o.clone());
                if o.is_blank() {
                    pending.push(o.clone());
                }
            }
        }
        out
    }

    /// Rename a node everywhere it appears as subject or object.
    pub fn rename(&mut self, from: &Term, to: &Term) {
        if from == to {
            return;
        }
        let outgoing = self.remove_subject(from);
        let incoming: Vec<(Term, Iri)> = self
            .referencing(from)
            .map(|(s, p)| (s.clone(), p.clone()))
            .collect();
        for (s, p) in &incoming {
            self.remove(s, p, from);
        }
        for (p, o) in outgoing {
            let o = if &o == from { to.clone() } else { o };
            self.insert(to.clone(), p, o);
        }
        for (s, p) in incoming {
            self.insert(s, p, to.clone());
        }
    }

    /// Subjects carrying `rdf:type class`.
    pub fn instances_of<'a>(&'a self, class: &Term) -> impl Iterator<Item = &'a Term> + 'a {
        self.ops
            .get(class)
            .into_iter()
            .flatten()
            .filter(|(_, p)| *p == crate::rdf::vocab::rdf::TYPE)
            .map(|(s, _)| s)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut g = Graph::new();
        for t in iter {
            g.insert_triple(t);
        }
        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::term::{BlankNode, Literal};
    use crate::rdf::vocab::rdfs;

    fn iri(s: &str) -> Term {
        Term::Iri(Iri::new(s).unwrap())
    }

    fn p(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_insert_is_a_set() {
        let mut g = Graph::new();
        assert!(g.insert(iri("http://a"), rdfs::LABEL, Literal::string("x")));
        assert!(!g.insert(iri("http://a"), rdfs::LABEL, Literal::string("x")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_remove_cleans_indexes() {
        let mut g = Graph::new();
        g.insert(iri("http://a"), p("http://p"), iri("http://b"));
        assert!(g.remove(&iri("http://a"), &p("http://p"), &iri("http://b")));
        assert!(g.is_empty());
        assert!(!g.is_referenced(&iri("http://b")));
        assert!(!g.has_subject(&iri("http://a")));
    }

    #[test]
    fn test_closure_one_level() {
        let mut g = Graph::new();
        let b1 = Term::Blank(BlankNode::new("b1").unwrap());
        let b2 = Term::Blank(BlankNode::new("b2").unwrap());
        g.insert(iri("http://a"), p("http://p"), b1.clone());
        g.insert(b1.clone(), p("http://q"), b2.clone());
        g.insert(b2.clone(), p("http://r"), Literal::string("deep"));
        g.insert(iri("http://other"), p("http://p"), iri("http://a"));

        let c = g.closure(&iri("http://a"));
        assert_eq!(c.len(), 2);
        assert!(!c.has_subject(&b2));
        assert!(!c.has_subject(&iri("http://other")));

        let deep = g.deep_closure(&iri("http://a"));
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_rename_subject_and_object() {
        let mut g = Graph::new();
        g.insert(iri("http://a"), p("http://p"), Literal::string("x"));
        g.insert(iri("http://c"), p("http://q"), iri("http://a"));
        g.rename(&iri("http://a"), &iri("http://b"));
        assert!(g.contains(&iri("http://b"), &p("http://p"), &Literal::string("x").into()));
        assert!(g.contains(&iri("http://c"), &p("http://q"), &iri("http://b")));
        assert!(!g.has_subject(&iri("http://a")));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_matching_wildcards() {
        let mut g = Graph::new();
        g.insert(iri("http://a"), p("http://p"), iri("http://x"));
        g.insert(iri("http://b"), p("http://p"), iri("http://x"));
        g.insert(iri("http://b"), p("http://q"), iri("http://y"));
        assert_eq!(g.matching(None, Some(&p("http://p")), None).len(), 2);
        assert_eq!(g.matching(None, None, Some(&iri("http://x"))).len(), 2);
        assert_eq!(g.matching(Some(&iri("http://b")), None, None).len(), 2);
    }
}
