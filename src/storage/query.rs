//! Basic graph pattern matching.
//!
//! A [`Query`] is a conjunction of triple patterns plus value conditions on
//! bound variables. Evaluation is a nested-loop join driven by the graph
//! indexes, which is plenty for registry-sized listings.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::rdf::nquads;
use crate::rdf::{Graph, Iri, RdfError, RdfResult, Term};

/// Variable name to bound term.
pub type Bindings = BTreeMap<String, Term>;

const VAR_SCHEME: &str = "urn:x-var:";

/// A pattern position: variable or fixed term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Var(String),
    Term(Term),
}

impl Node {
    pub fn var(name: impl Into<String>) -> Self {
        Node::Var(name.into())
    }

    fn resolve<'b>(&'b self, bindings: &'b Bindings) -> Option<&'b Term> {
        match self {
            Node::Var(name) => bindings.get(name),
            Node::Term(t) => Some(t),
        }
    }
}

impl From<Term> for Node {
    fn from(t: Term) -> Self {
        Node::Term(t)
    }
}

impl From<Iri> for Node {
    fn from(iri: Iri) -> Self {
        Node::Term(Term::Iri(iri))
    }
}

impl From<&Iri> for Node {
    fn from(iri: &Iri) -> Self {
        Node::Term(Term::Iri(iri.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

/// `?var op value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub var: String,
    pub op: CompareOp,
    pub value: Term,
}

impl Condition {
    fn holds(&self, bindings: &Bindings) -> bool {
        let Some(bound) = bindings.get(&self.var) else {
            return false;
        };
        if self.op == CompareOp::Eq && *bound == self.value {
            return true;
        }
        match (bound, &self.value) {
            (Term::Literal(a), Term::Literal(b)) => {
                a.compare(b).is_some_and(|ord| self.op.accepts(ord))
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    patterns: Vec<TriplePattern>,
    conditions: Vec<Condition>,
    order_by: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, subject: impl Into<Node>, predicate: impl Into<Node>, object: impl Into<Node>) -> Self {
        self.patterns.push(TriplePattern {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        });
        self
    }

    pub fn push_pattern(&mut self, pattern: TriplePattern) {
        self.patterns.push(pattern);
    }

    pub fn condition(mut self, var: impl Into<String>, op: CompareOp, value: Term) -> Self {
        self.conditions.push(Condition {
            var: var.into(),
            op,
            value,
        });
        self
    }

    pub fn push_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn order_by(mut self, var: impl Into<String>) -> Self {
        self.order_by.push(var.into());
        self
    }

    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    /// Parse one pattern per line, N-Triples syntax with `?name` variables:
    ///
    /// ```text
    /// ?s <http://www.w3.org/2000/01/rdf-schema#label> ?label .
    /// ```
    pub fn parse(text: &str) -> RdfResult<Self> {
        let mut query = Query::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut rewritten: Vec<String> = line
                .split_whitespace()
                .map(|tok| match tok.strip_prefix('?') {
                    Some(name) => format!("<{}{}>", VAR_SCHEME, name.trim_end_matches('.')),
                    None => tok.to_string(),
                })
                .collect();
            if !rewritten.last().is_some_and(|t| t.ends_with('.')) {
                rewritten.push(".".to_string());
            }
            let mut quads = nquads::parse_str(&rewritten.join(" "))
                .map_err(|e| RdfError::syntax(i + 1, e.to_string()))?;
            let quad = match (quads.pop(), quads.is_empty()) {
                (Some(quad), true) => quad,
                _ => return Err(RdfError::syntax(i + 1, "expected exactly one pattern")),
            };
            if quad.graph.is_some() {
                return Err(RdfError::syntax(i + 1, "patterns have three positions"));
            }
            query.patterns.push(TriplePattern {
                subject: unvar(quad.triple.subject),
                predicate: unvar(Term::Iri(quad.triple.predicate)),
                object: unvar(quad.triple.object),
            });
        }
        Ok(query)
    }

    /// Evaluate against a graph.
    pub fn evaluate(&self, graph: &Graph) -> Vec<Bindings> {
        self.evaluate_from(graph, Bindings::new())
    }

    /// Evaluate with some variables pre-bound.
    pub fn evaluate_from(&self, graph: &Graph, initial: Bindings) -> Vec<Bindings> {
        let mut solutions = vec![initial];
        for pattern in &self.patterns {
            let mut next = Vec::new();
            for bindings in &solutions {
                extend_solutions(graph, pattern, bindings, &mut next);
            }
            solutions = next;
            if solutions.is_empty() {
                break;
            }
        }
        solutions.retain(|b| self.conditions.iter().all(|c| c.holds(b)));
        if !self.order_by.is_empty() {
            solutions.sort_by(|a, b| {
                for var in &self.order_by {
                    let ord = compare_bound(a.get(var), b.get(var));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        solutions
    }
}

fn unvar(term: Term) -> Node {
    match &term {
        Term::Iri(iri) => match iri.as_str().strip_prefix(VAR_SCHEME) {
            Some(name) => Node::Var(name.to_string()),
            None => Node::Term(term),
        },
        _ => Node::Term(term),
    }
}

fn compare_bound(a: Option<&Term>, b: Option<&Term>) -> Ordering {
    match (a, b) {
        (Some(Term::Literal(x)), Some(Term::Literal(y))) => x
            .compare(y)
            .unwrap_or_else(|| x.lexical().cmp(y.lexical())),
        (Some(x), Some(y)) => x.lexical().cmp(y.lexical()),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

fn extend_solutions(graph: &Graph, pattern: &TriplePattern, bindings: &Bindings, out: &mut Vec<Bindings>) {
    let subject = pattern.subject.resolve(bindings);
    let predicate = match pattern.predicate.resolve(bindings) {
        Some(Term::Iri(iri)) => Some(iri),
        Some(_) => return,
        None => None,
    };
    let object = pattern.object.resolve(bindings);

    for triple in graph.matching(subject, predicate, object) {
        let mut b = bindings.clone();
        if bind(&mut b, &pattern.subject, triple.subject)
            && bind(&mut b, &pattern.predicate, Term::Iri(triple.predicate))
            && bind(&mut b, &pattern.object, triple.object)
        {
            out.push(b);
        }
    }
}

/// Bind a variable, failing if the same variable already holds another value
/// (e.g. `?x <p> ?x`).
fn bind(bindings: &mut Bindings, node: &Node, value: Term) -> bool {
    match node {
        Node::Term(_) => true,
        Node::Var(name) => match bindings.get(name) {
            Some(existing) => *existing == value,
            None => {
                bindings.insert(name.clone(), value);
                true
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::{rdf, rdfs};
    use crate::rdf::Literal;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    fn sample() -> Graph {
        let mut g = Graph::new();
        for (name, size) in [("a", 3), ("b", 10), ("c", 7)] {
            let s = iri(&format!("http://example.com/{}", name));
            g.insert(s.clone(), rdf::TYPE, iri("http://example.com/Thing"));
            g.insert(s.clone(), rdfs::LABEL, Literal::string(name));
            g.insert(s, iri("http://example.com/size"), Literal::integer(size));
        }
        g
    }

    #[test]
    fn test_join_and_order() {
        let q = Query::new()
            .pattern(Node::var("s"), rdf::TYPE, iri("http://example.com/Thing"))
            .pattern(Node::var("s"), iri("http://example.com/size"), Node::var("size"))
            .order_by("size");
        let rows = q.evaluate(&sample());
        let sizes: Vec<i64> = rows
            .iter()
            .filter_map(|b| b.get("size").and_then(Term::as_literal).and_then(|l| l.as_i64()))
            .collect();
        assert_eq!(sizes, vec![3, 7, 10]);
    }

    #[test]
    fn test_conditions() {
        let q = Query::new()
            .pattern(Node::var("s"), iri("http://example.com/size"), Node::var("size"))
            .condition("size", CompareOp::Ge, Literal::integer(7).into());
        assert_eq!(q.evaluate(&sample()).len(), 2);
    }

    #[test]
    fn test_parse() {
        let q = Query::parse(
            "?s <http://www.w3.org/2000/01/rdf-schema#label> \"b\" .\n?s <http://example.com/size> ?n",
        )
        .unwrap();
        assert_eq!(q.patterns().len(), 2);
        let rows = q.evaluate(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("n").and_then(Term::as_literal).and_then(|l| l.as_i64()), Some(10));
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let mut g = Graph::new();
        g.insert(iri("http://x"), iri("http://p"), iri("http://x"));
        g.insert(iri("http://x"), iri("http://p"), iri("http://y"));
        let q = Query::new().pattern(Node::var("a"), iri("http://p"), Node::var("a"));
        assert_eq!(q.evaluate(&g).len(), 1);
    }
}
