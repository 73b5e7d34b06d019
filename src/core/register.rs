//! Registers: versioned containers of register items.

use chrono::{DateTime, Utc};

use crate::core::description::Description;
use crate::core::error::ModelResult;
use crate::core::notation;
use crate::core::status::Status;
use crate::rdf::vocab::{ldp, rdfs, reg};
use crate::rdf::{Graph, Iri, Term};
use crate::store::{FilterSpec, RegisterEntryInfo, StoreReader, StoreResult};

#[derive(Debug, Clone)]
pub struct Register {
    description: Description,
}

impl Register {
    pub fn new(description: Description) -> Self {
        Self { description }
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn description_mut(&mut self) -> &mut Description {
        &mut self.description
    }

    pub fn into_description(self) -> Description {
        self.description
    }

    pub fn uri(&self) -> Option<&Iri> {
        self.description.uri()
    }

    pub fn require_uri(&self) -> ModelResult<&Iri> {
        self.description.require_uri()
    }

    pub fn item_uri(&self, notation: &str) -> ModelResult<Iri> {
        notation::item_uri(self.require_uri()?, notation)
    }

    pub fn entity_uri(&self, notation: &str) -> ModelResult<Iri> {
        notation::entity_uri(self.require_uri()?, notation)
    }

    /// Registers declared directly below this one.
    pub fn subregisters(&self) -> Vec<Iri> {
        self.description
            .values(&reg::SUBREGISTER)
            .filter_map(Term::as_iri)
            .cloned()
            .collect()
    }

    /// The predicate used to present members, in declaration priority:
    /// `ldp:membershipPredicate`, `reg:inverseMembershipPredicate`,
    /// falling back to `rdfs:member`.
    pub fn membership(&self) -> Membership {
        let declared = |p: &Iri| self.description.value(p).and_then(Term::as_iri).cloned();
        if let Some(predicate) = declared(&ldp::MEMBERSHIP_PREDICATE) {
            Membership {
                predicate,
                inverse: false,
            }
        } else if let Some(predicate) = declared(&reg::INVERSE_MEMBERSHIP_PREDICATE) {
            Membership {
                predicate,
                inverse: true,
            }
        } else {
            Membership {
                predicate: rdfs::MEMBER,
                inverse: false,
            }
        }
    }

    /// Lightweight listing of current members.
    pub fn list_members(&self, reader: &StoreReader<'_>, filters: &[FilterSpec]) -> StoreResult<Vec<RegisterEntryInfo>> {
        reader.list_members(self, filters)
    }

    /// Materialize a page of members into one graph.
    pub fn construct_view(&self, reader: &StoreReader<'_>, options: &ViewOptions) -> StoreResult<RegisterView> {
        reader.construct_view(self, options)
    }
}

/// How membership is shown in a register view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub predicate: Iri,
    /// `member predicate register` instead of `register predicate member`.
    pub inverse: bool,
}

impl Membership {
    pub fn link(&self, graph: &mut Graph, register: &Term, member: &Term) {
        if self.inverse {
            graph.insert(member.clone(), self.predicate.clone(), register.clone());
        } else {
            graph.insert(register.clone(), self.predicate.clone(), member.clone());
        }
    }
}

/// Options for [`Register::construct_view`].
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Keep item version resources instead of flattening them.
    pub with_version: bool,
    /// Include item metadata, not only the entities.
    pub with_metadata: bool,
    /// Only members whose status is (a specialization of) this one.
    pub status: Status,
    pub offset: usize,
    /// Maximum number of members; `None` for no limit.
    pub limit: Option<usize>,
    /// Show membership as it was at this instant.
    pub at: Option<DateTime<Utc>>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            with_version: false,
            with_metadata: false,
            status: Status::Accepted,
            offset: 0,
            limit: None,
            at: None,
        }
    }
}

impl ViewOptions {
    pub fn with_metadata(mut self, with_metadata: bool) -> Self {
        self.with_metadata = with_metadata;
        self
    }

    pub fn with_version(mut self, with_version: bool) -> Self {
        self.with_version = with_version;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn page(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }
}

/// A materialized page of a register.
#[derive(Debug, Clone)]
pub struct RegisterView {
    pub graph: Graph,
    /// Entities shown, in notation order.
    pub members: Vec<Term>,
    /// False if the page was cut short by `limit`.
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::rdf;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    fn register(extra: &[(Iri, Iri)]) -> Register {
        let root = iri("http://example.com/reg1");
        let mut g = Graph::new();
        g.insert(root.clone(), rdf::TYPE, reg::REGISTER);
        for (p, o) in extra {
            g.insert(root.clone(), p.clone(), o.clone());
        }
        Register::new(Description::new(root, g))
    }

    #[test]
    fn test_membership_default() {
        let m = register(&[]).membership();
        assert_eq!(m.predicate, rdfs::MEMBER);
        assert!(!m.inverse);
    }

    #[test]
    fn test_membership_inverse() {
        let broader = iri("http://www.w3.org/2004/02/skos/core#inScheme");
        let m = register(&[(reg::INVERSE_MEMBERSHIP_PREDICATE, broader.clone())]).membership();
        assert_eq!(m, Membership { predicate: broader.clone(), inverse: true });

        let mut g = Graph::new();
        let r = Term::from(iri("http://example.com/reg1"));
        let e = Term::from(iri("http://example.com/reg1/red"));
        m.link(&mut g, &r, &e);
        assert!(g.contains(&e, &broader, &r));
    }

    #[test]
    fn test_item_uri() {
        let r = register(&[]);
        assert_eq!(r.item_uri("red").unwrap().as_str(), "http://example.com/reg1/_red");
        assert_eq!(r.entity_uri("red").unwrap().as_str(), "http://example.com/reg1/red");
    }
}
