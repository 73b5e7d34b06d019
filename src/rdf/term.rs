//! RDF terms.
//!
//! Terms wrap the `oxrdf` model and add a total order so that graphs can
//! keep them in ordered indexes and iterate deterministically. IRIs stay a
//! `Cow` so vocabulary constants can be built at compile time.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use oxrdf::NamedNodeRef;
use serde::{Deserialize, Serialize, Serializer};

use crate::rdf::error::{RdfError, RdfResult};
use crate::rdf::vocab::xsd;

/// An absolute IRI.
///
/// Vocabulary constants are built with [`Iri::from_static`] and never
/// allocate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Iri(Cow<'static, str>);

impl Iri {
    /// Create an IRI, rejecting anything `oxrdf` would not accept as a
    /// named node.
    pub fn new(iri: impl Into<String>) -> RdfResult<Self> {
        let iri = iri.into();
        match oxrdf::NamedNode::new(iri.as_str()) {
            Ok(_) => Ok(Self(Cow::Owned(iri))),
            Err(e) => Err(RdfError::InvalidIri {
                reason: e.to_string(),
                iri,
            }),
        }
    }

    /// Wrap a compile-time constant without validation.
    pub const fn from_static(iri: &'static str) -> Self {
        Self(Cow::Borrowed(iri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0.into_owned()
    }

    /// Append a suffix, e.g. `#graph` or `:3`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(Cow::Owned(format!("{}{}", self.0, suffix)))
    }

    pub fn as_named_node(&self) -> NamedNodeRef<'_> {
        NamedNodeRef::new_unchecked(self.as_str())
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<oxrdf::NamedNode> for Iri {
    fn from(node: oxrdf::NamedNode) -> Self {
        Self(Cow::Owned(node.into_string()))
    }
}

impl From<&Iri> for oxrdf::NamedNode {
    fn from(iri: &Iri) -> Self {
        oxrdf::NamedNode::new_unchecked(iri.as_str())
    }
}

/// A blank node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(oxrdf::BlankNode);

impl BlankNode {
    pub fn new(label: impl Into<String>) -> RdfResult<Self> {
        let label = label.into();
        oxrdf::BlankNode::new(label.as_str())
            .map(Self)
            .map_err(|e| RdfError::InvalidTerm {
                term: format!("_:{}", label),
                reason: e.to_string(),
            })
    }

    /// Allocate a node that is unique across stores and exports.
    pub fn fresh() -> Self {
        Self(oxrdf::BlankNode::default())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_oxrdf(&self) -> &oxrdf::BlankNode {
        &self.0
    }
}

impl Ord for BlankNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for BlankNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for BlankNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<oxrdf::BlankNode> for BlankNode {
    fn from(node: oxrdf::BlankNode) -> Self {
        Self(node)
    }
}

/// A literal value: lexical form, datatype and optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(oxrdf::Literal);

impl Literal {
    /// Plain `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self(oxrdf::Literal::new_simple_literal(value))
    }

    /// Language tagged string.
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self(oxrdf::Literal::new_language_tagged_literal_unchecked(
            value,
            language.into().to_ascii_lowercase(),
        ))
    }

    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self(oxrdf::Literal::new_typed_literal(
            lexical,
            oxrdf::NamedNode::from(&datatype),
        ))
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), xsd::INTEGER)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), xsd::BOOLEAN)
    }

    pub fn date_time(value: DateTime<Utc>) -> Self {
        Self::typed(
            value.to_rfc3339_opts(SecondsFormat::Millis, true),
            xsd::DATE_TIME,
        )
    }

    /// Guess a typed literal from request text: integers, decimals,
    /// booleans and date-times are recognised, anything else is a string.
    pub fn infer(text: &str) -> Self {
        if text.parse::<i64>().is_ok() {
            Self::typed(text, xsd::INTEGER)
        } else if text.parse::<f64>().is_ok() && text.contains('.') {
            Self::typed(text, xsd::DECIMAL)
        } else if text == "true" || text == "false" {
            Self::typed(text, xsd::BOOLEAN)
        } else if DateTime::parse_from_rfc3339(text).is_ok() {
            Self::typed(text, xsd::DATE_TIME)
        } else {
            Self::string(text)
        }
    }

    pub fn lexical(&self) -> &str {
        self.0.value()
    }

    pub fn datatype(&self) -> Iri {
        Iri::from(self.0.datatype().into_owned())
    }

    pub fn has_datatype(&self, datatype: &Iri) -> bool {
        self.0.datatype().as_str() == datatype.as_str()
    }

    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    pub fn as_oxrdf(&self) -> &oxrdf::Literal {
        &self.0
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.lexical().trim().parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        if xsd::is_numeric(&self.datatype()) {
            self.lexical().trim().parse().ok()
        } else {
            None
        }
    }

    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.lexical().trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Value comparison used by filters.
    ///
    /// Numbers compare numerically and date-times chronologically; other
    /// literals only compare when their datatypes agree.
    pub fn compare(&self, other: &Literal) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.partial_cmp(&b);
        }
        if self.has_datatype(&xsd::DATE_TIME) && other.has_datatype(&xsd::DATE_TIME) {
            return Some(self.as_date_time()?.cmp(&other.as_date_time()?));
        }
        if self.0.datatype() == other.0.datatype() && self.language() == other.language() {
            return Some(self.lexical().cmp(other.lexical()));
        }
        None
    }
}

impl Ord for Literal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lexical()
            .cmp(other.lexical())
            .then_with(|| self.0.datatype().as_str().cmp(other.0.datatype().as_str()))
            .then_with(|| self.language().cmp(&other.language()))
    }
}

impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<oxrdf::Literal> for Literal {
    fn from(lit: oxrdf::Literal) -> Self {
        match lit.language() {
            // keep tags lowercase whatever the source wrote
            Some(lang) => Self::lang(lit.value(), lang),
            None => Self(lit),
        }
    }
}

/// Any RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Term {
    Iri(Iri),
    Blank(BlankNode),
    Literal(Literal),
}

impl Term {
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Lexical form for literals, the IRI text for IRIs.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.as_str(),
            Term::Blank(b) => b.as_str(),
            Term::Literal(lit) => lit.lexical(),
        }
    }

    pub fn to_oxrdf(&self) -> oxrdf::Term {
        match self {
            Term::Iri(iri) => oxrdf::NamedNode::from(iri).into(),
            Term::Blank(b) => b.as_oxrdf().clone().into(),
            Term::Literal(lit) => lit.as_oxrdf().clone().into(),
        }
    }

    /// The term in subject position; literals cannot appear there.
    pub fn to_oxrdf_subject(&self) -> RdfResult<oxrdf::Subject> {
        match self {
            Term::Iri(iri) => Ok(oxrdf::NamedNode::from(iri).into()),
            Term::Blank(b) => Ok(b.as_oxrdf().clone().into()),
            Term::Literal(_) => Err(RdfError::InvalidTerm {
                term: self.to_string(),
                reason: "literal in subject position".to_string(),
            }),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(b) => write!(f, "{}", b),
            Term::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<&Iri> for Term {
    fn from(iri: &Iri) -> Self {
        Term::Iri(iri.clone())
    }
}

impl From<BlankNode> for Term {
    fn from(b: BlankNode) -> Self {
        Term::Blank(b)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<oxrdf::Term> for Term {
    fn from(term: oxrdf::Term) -> Self {
        match term {
            oxrdf::Term::NamedNode(node) => Term::Iri(node.into()),
            oxrdf::Term::BlankNode(node) => Term::Blank(node.into()),
            oxrdf::Term::Literal(lit) => Term::Literal(lit.into()),
        }
    }
}

impl From<oxrdf::Subject> for Term {
    fn from(subject: oxrdf::Subject) -> Self {
        match subject {
            oxrdf::Subject::NamedNode(node) => Term::Iri(node.into()),
            oxrdf::Subject::BlankNode(node) => Term::Blank(node.into()),
        }
    }
}

/// A statement in a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

impl Triple {
    /// The statement as an `oxrdf` quad in `graph` (default graph for `None`).
    pub fn to_oxrdf_quad(&self, graph: Option<&Iri>) -> RdfResult<oxrdf::Quad> {
        let graph = match graph {
            Some(name) => oxrdf::GraphName::NamedNode(name.into()),
            None => oxrdf::GraphName::DefaultGraph,
        };
        Ok(oxrdf::Quad::new(
            self.subject.to_oxrdf_subject()?,
            oxrdf::NamedNode::from(&self.predicate),
            self.object.to_oxrdf(),
            graph,
        ))
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// A triple placed in the default graph (`graph == None`) or a named graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    pub graph: Option<Iri>,
    pub triple: Triple,
}

impl Quad {
    pub fn new(graph: Option<Iri>, triple: Triple) -> Self {
        Self { graph, triple }
    }

    pub fn to_oxrdf(&self) -> RdfResult<oxrdf::Quad> {
        self.triple.to_oxrdf_quad(self.graph.as_ref())
    }
}

impl TryFrom<oxrdf::Quad> for Quad {
    type Error = RdfError;

    fn try_from(quad: oxrdf::Quad) -> RdfResult<Self> {
        let graph = match quad.graph_name {
            oxrdf::GraphName::DefaultGraph => None,
            oxrdf::GraphName::NamedNode(name) => Some(name.into()),
            oxrdf::GraphName::BlankNode(node) => {
                return Err(RdfError::InvalidTerm {
                    term: node.to_string(),
                    reason: "graph names must be IRIs".to_string(),
                })
            }
        };
        Ok(Quad::new(
            graph,
            Triple::new(Term::from(quad.subject), quad.predicate.into(), Term::from(quad.object)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iri_validation() {
        assert!(Iri::new("http://example.com/a").is_ok());
        assert!(Iri::new("").is_err());
        assert!(Iri::new("http://example.com/a b").is_err());
        assert!(Iri::new("http://example.com/<a>").is_err());
    }

    #[test]
    fn test_static_and_owned_iris_are_equal() {
        let owned = Iri::new("http://www.w3.org/2001/XMLSchema#string").unwrap();
        assert_eq!(owned, xsd::STRING);
    }

    #[test]
    fn test_fresh_blank_nodes_differ() {
        assert_ne!(BlankNode::fresh(), BlankNode::fresh());
        assert!(BlankNode::new("not a label").is_err());
    }

    #[test]
    fn test_literal_compare_numeric() {
        let a = Literal::integer(9);
        let b = Literal::typed("10.5", xsd::DECIMAL);
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(Literal::string("x").compare(&a), None);
    }

    #[test]
    fn test_literal_date_time() {
        let t = Utc.with_ymd_and_hms(2013, 1, 27, 10, 30, 0).unwrap();
        let lit = Literal::date_time(t);
        assert_eq!(lit.lexical(), "2013-01-27T10:30:00.000Z");
        assert_eq!(lit.as_date_time(), Some(t));
    }

    #[test]
    fn test_literal_infer() {
        assert_eq!(Literal::infer("42").datatype(), xsd::INTEGER);
        assert_eq!(Literal::infer("4.2").datatype(), xsd::DECIMAL);
        assert_eq!(Literal::infer("red").datatype(), xsd::STRING);
        assert_eq!(Literal::infer("2013-01-27T10:30:00Z").datatype(), xsd::DATE_TIME);
    }

    #[test]
    fn test_quad_conversion_keeps_graph() {
        let quad = Quad::new(
            Some(Iri::new("http://example.com/g").unwrap()),
            Triple::new(
                Iri::new("http://example.com/a").unwrap(),
                xsd::STRING,
                Literal::lang("rouge", "FR"),
            ),
        );
        let back = Quad::try_from(quad.to_oxrdf().unwrap()).unwrap();
        assert_eq!(back, quad);
        assert_eq!(back.triple.object.as_literal().and_then(|l| l.language()), Some("fr"));
    }

    #[test]
    fn test_literal_subject_rejected() {
        let quad = Quad::new(None, Triple::new(Literal::string("x"), xsd::STRING, Literal::string("y")));
        assert!(quad.to_oxrdf().is_err());
    }
}
