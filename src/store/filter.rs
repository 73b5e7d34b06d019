//! Property filters for listings and search.
//!
//! Request keys name a property, optionally prefixed with a bound:
//!
//! ```text
//!   rdfs:label=red          ?entity rdfs:label ?f0 . FILTER(?f0 =  "red")
//!   min-ex:size=3           ?entity ex:size    ?f1 . FILTER(?f1 >= 3)
//!   maxEx-ex:size=10        ?entity ex:size    ?f2 . FILTER(?f2 <  10)
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::rdf::vocab::expand_prefixed;
use crate::rdf::{Iri, Literal, Term};
use crate::storage::{CompareOp, Node, Query};
use crate::store::error::{StoreError, StoreResult};

static FILTER_KEY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(min-|minEx-|max-|maxEx-)?([a-zA-Z][\w\-\.]*:.*)$"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub property: Iri,
    pub op: CompareOp,
    pub value: Term,
}

impl FilterSpec {
    pub fn new(property: Iri, op: CompareOp, value: impl Into<Term>) -> Self {
        Self {
            property,
            op,
            value: value.into(),
        }
    }

    pub fn equals(property: Iri, value: impl Into<Term>) -> Self {
        Self::new(property, CompareOp::Eq, value)
    }

    /// Parse a request parameter. Keys that do not look like a property
    /// name yield `Ok(None)`.
    pub fn parse(key: &str, value: &str) -> StoreResult<Option<Self>> {
        let pattern = FILTER_KEY.as_ref().map_err(|e| StoreError::InvalidFilter {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let Some(caps) = pattern.captures(key) else {
            return Ok(None);
        };
        let op = match caps.get(1).map(|m| m.as_str()) {
            None => CompareOp::Eq,
            Some("min-") => CompareOp::Ge,
            Some("minEx-") => CompareOp::Gt,
            Some("max-") => CompareOp::Le,
            Some("maxEx-") => CompareOp::Lt,
            Some(other) => {
                return Err(StoreError::InvalidFilter {
                    key: key.to_string(),
                    reason: format!("unknown bound {}", other),
                })
            }
        };
        let name = caps.get(2).map_or("", |m| m.as_str());
        let property = resolve_name(name).ok_or_else(|| StoreError::InvalidFilter {
            key: key.to_string(),
            reason: format!("cannot resolve property name {}", name),
        })?;
        Ok(Some(Self::new(property, op, parse_value(value))))
    }

    /// Parse every filter-shaped parameter, ignoring the others.
    pub fn from_params<'a, I>(params: I) -> StoreResult<Vec<Self>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = Vec::new();
        for (k, v) in params {
            if let Some(f) = Self::parse(k, v)? {
                filters.push(f);
            }
        }
        Ok(filters)
    }

    /// Append this filter to a query, constraining `subject_var`.
    pub fn apply(&self, query: Query, subject_var: &str, index: usize) -> Query {
        let var = format!("f{}", index);
        query
            .pattern(Node::var(subject_var), self.property.clone(), Node::var(var.as_str()))
            .condition(var, self.op, self.value.clone())
    }
}

/// Apply a list of filters with distinct variable names.
pub fn apply_all(mut query: Query, filters: &[FilterSpec], subject_var: &str) -> Query {
    for (i, f) in filters.iter().enumerate() {
        query = f.apply(query, subject_var, i);
    }
    query
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {} {}", self.property, self.op.symbol(), self.value)
    }
}

fn resolve_name(name: &str) -> Option<Iri> {
    if name.contains("://") {
        Iri::new(name).ok()
    } else {
        expand_prefixed(name)
    }
}

fn parse_value(value: &str) -> Term {
    if let Some(inner) = value.strip_prefix('<').and_then(|v| v.strip_suffix('>')) {
        if let Ok(iri) = Iri::new(inner) {
            return Term::Iri(iri);
        }
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        if let Ok(iri) = Iri::new(value) {
            return Term::Iri(iri);
        }
    }
    Term::Literal(Literal::infer(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::{rdfs, reg};

    #[test]
    fn test_parse_bounds() {
        let f = FilterSpec::parse("min-rdfs:label", "a").unwrap().unwrap();
        assert_eq!(f.op, CompareOp::Ge);
        assert_eq!(f.property, rdfs::LABEL);

        let f = FilterSpec::parse("maxEx-http://example.com/size", "10").unwrap().unwrap();
        assert_eq!(f.op, CompareOp::Lt);
        assert_eq!(f.value, Term::Literal(Literal::integer(10)));

        let f = FilterSpec::parse("reg:status", "<http://purl.org/linked-data/registry#statusStable>")
            .unwrap()
            .unwrap();
        assert_eq!(f.property, reg::STATUS);
        assert!(f.value.is_iri());
    }

    #[test]
    fn test_non_filter_keys_are_ignored() {
        assert_eq!(FilterSpec::parse("_page", "1").unwrap(), None);
        assert_eq!(FilterSpec::parse("limit", "1").unwrap(), None);
        let filters = FilterSpec::from_params([("limit", "5"), ("rdfs:label", "red")]).unwrap();
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn test_unknown_prefix_is_rejected() {
        let err = FilterSpec::parse("nope:thing", "x").unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter { .. }));
    }
}
