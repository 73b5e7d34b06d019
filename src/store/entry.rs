//! Lightweight listing records.

use serde::Serialize;

use crate::core::Status;
use crate::rdf::{Iri, Term};

/// One member of a register, without its entity content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntryInfo {
    pub item: Iri,
    pub entity: Term,
    pub notation: String,
    pub status: Status,
    pub labels: Vec<String>,
    pub types: Vec<Iri>,
}

impl RegisterEntryInfo {
    pub fn label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}

/// Where an entity is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityInfo {
    pub entity: Iri,
    pub item: Iri,
    pub register: Iri,
    pub status: Status,
}

/// How requests below a delegation point are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegationKind {
    /// Redirect to the target.
    Forward,
    /// Proxy to a federated registry.
    Federate,
    /// Members are enumerated from the target by a triple pattern.
    Delegate,
}

/// A delegation, federation or forwarding point held by an accepted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegationRecord {
    pub record: Iri,
    pub target: Iri,
    pub kind: DelegationKind,
    /// HTTP status used for redirects. Unset for `Delegate`.
    pub forwarding_code: Option<u16>,
    pub subject: Option<Iri>,
    pub predicate: Option<Iri>,
    pub object: Option<Iri>,
}

impl DelegationRecord {
    pub const DEFAULT_FORWARDING_CODE: u16 = 307;
}
