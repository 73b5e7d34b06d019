//! Free-text search seam and search requests.

use crate::core::Status;
use crate::rdf::{Graph, Term};
use crate::store::filter::FilterSpec;

/// An external free-text index.
///
/// Implementations return the subjects whose text matches; the store
/// resolves those to register items and applies the remaining criteria.
pub trait TextIndex: Send + Sync {
    fn search(&self, graph: &Graph, text: &str) -> Vec<Term>;
}

/// Case-insensitive substring match over every literal in the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralTextIndex;

impl TextIndex for LiteralTextIndex {
    fn search(&self, graph: &Graph, text: &str) -> Vec<Term> {
        let needle = text.to_lowercase();
        let mut hits: Vec<Term> = graph
            .iter()
            .filter(|(_, _, o)| {
                o.as_literal()
                    .is_some_and(|lit| lit.lexical().to_lowercase().contains(&needle))
            })
            .map(|(s, _, _)| s.clone())
            .collect();
        hits.dedup();
        hits
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Only items whose current status is (a specialization of) this one.
    pub status: Option<Status>,
    pub filters: Vec<FilterSpec>,
    /// Match historical versions as well as current ones.
    pub include_versions: bool,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn include_versions(mut self, include: bool) -> Self {
        self.include_versions = include;
        self
    }

    pub fn page(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}
