//! Register items: versioned metadata wrappers around a managed entity.

use chrono::{DateTime, Utc};

use crate::core::description::Description;
use crate::core::error::{ModelError, ModelResult};
use crate::core::notation;
use crate::core::status::Status;
use crate::rdf::vocab::{dct, rdf, rdfs, reg, skos};
use crate::rdf::{Graph, Iri, Literal, Term};
use crate::version::RigidProperties;

/// Properties kept on the item root across versions.
pub const RIGID_PROPERTIES: [Iri; 6] = [
    reg::REGISTER_PROP,
    reg::NOTATION,
    reg::ITEM_CLASS,
    reg::PREDECESSOR,
    reg::SUBMITTER,
    dct::DATE_SUBMITTED,
];

/// Rigid properties a caller may never change once stored.
pub const IDENTITY_PROPERTIES: [Iri; 2] = [reg::REGISTER_PROP, reg::NOTATION];

pub fn rigid_properties() -> RigidProperties {
    RigidProperties::new(RIGID_PROPERTIES)
}

/// Label properties, most preferred first.
const LABEL_PROPERTIES: [Iri; 3] = [skos::PREF_LABEL, skos::ALT_LABEL, rdfs::LABEL];

#[derive(Debug, Clone)]
pub struct RegisterItem {
    description: Description,
    entity: Option<Description>,
    notation: Option<String>,
    as_graph: bool,
}

impl RegisterItem {
    pub fn new(description: Description) -> Self {
        Self {
            description,
            entity: None,
            notation: None,
            as_graph: false,
        }
    }

    /// Build an item for a submitted entity with no explicit item payload.
    ///
    /// A blank-node entity is given a fresh notation and moved to
    /// `<register>/<notation>`; an entity already inside the register keeps
    /// its path as notation; an absolute entity elsewhere keeps its URI.
    pub fn from_entity_request(
        payload: &Graph,
        entity: &Term,
        register: &Iri,
        is_new: bool,
        at: DateTime<Utc>,
    ) -> ModelResult<Self> {
        let notation = match entity {
            Term::Iri(uri) => match notation::relative_path(uri, register) {
                Some(path) => path.to_string(),
                None => notation::generate(),
            },
            _ => notation::generate(),
        };
        notation::validate(&notation)?;

        let item_uri = notation::item_uri(register, &notation)?;
        let mut root = Description::new(item_uri, Graph::new());
        root.add_property(rdf::TYPE, reg::REGISTER_ITEM);
        root.add_property(reg::NOTATION, Literal::string(notation.as_str()));

        let mut item = RegisterItem {
            description: root,
            entity: None,
            notation: Some(notation),
            as_graph: false,
        };
        let entity_desc = Description::new(entity.clone(), payload.deep_closure(entity));
        item.attach_relocated_entity(entity_desc, register)?;
        item.update_for_entity(is_new, at);
        Ok(item)
    }

    /// Build an item from an explicit item payload carrying
    /// `reg:definition [ reg:entity <e> ]`.
    pub fn from_item_request(
        payload: &Graph,
        item: &Term,
        register: &Iri,
        is_new: bool,
        at: DateTime<Utc>,
    ) -> ModelResult<Self> {
        let entity = payload
            .object(item, &reg::DEFINITION)
            .and_then(|def| payload.object(def, &reg::ENTITY))
            .cloned()
            .ok_or_else(|| {
                ModelError::inconsistent(item.lexical(), "item has no reg:definition/reg:entity")
            })?;

        let notation = resolve_item_notation(payload, item, register)?;
        let item_uri = notation::item_uri(register, &notation)?;

        let mut working = payload.clone();
        let item_term = Term::Iri(item_uri.clone());
        working.rename(item, &item_term);
        let mut result = RegisterItem {
            description: Description::new(item_uri, working.deep_closure(&item_term)),
            entity: None,
            notation: Some(notation),
            as_graph: false,
        };
        let entity_desc = Description::new(entity.clone(), working.deep_closure(&entity));
        result.attach_relocated_entity(entity_desc, register)?;
        result.update_for_entity(is_new, at);
        Ok(result)
    }

    fn attach_relocated_entity(&mut self, mut entity: Description, register: &Iri) -> ModelResult<()> {
        let notation = self.notation().unwrap_or_default().to_string();
        let target = match entity.root() {
            Term::Iri(uri) => match notation::relative_path(uri, register) {
                Some(path) if path != notation => {
                    return Err(ModelError::inconsistent(
                        uri.as_str(),
                        format!("entity path doesn't match its notation '{}'", notation),
                    ));
                }
                Some(_) => notation::entity_uri(register, &notation)?,
                None => uri.clone(),
            },
            _ => notation::entity_uri(register, &notation)?,
        };
        if entity.root() != &Term::Iri(target.clone()) {
            let old = entity.root().clone();
            entity.relocate(target.clone());
            // keep the item's definition link pointing at the moved entity
            self.description.graph_mut().rename(&old, &Term::Iri(target));
        }
        self.entity = Some(entity);
        Ok(())
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

    /// Stored `reg:notation`, or the notation resolved when the item was built.
    pub fn notation(&self) -> Option<&str> {
        self.description
            .lexical_value(&reg::NOTATION)
            .or(self.notation.as_deref())
    }

    pub fn register_uri(&self) -> Option<&Iri> {
        self.description.value(&reg::REGISTER_PROP).and_then(Term::as_iri)
    }

    pub fn status(&self) -> Status {
        self.description
            .value(&reg::STATUS)
            .map_or(Status::NotAccepted, Status::for_resource)
    }

    /// Change status, enforcing the default lifecycle.
    pub fn set_status(&mut self, to: Status) -> ModelResult<()> {
        let from = self.status();
        if !from.legal_next_state(to) {
            return Err(ModelError::IllegalTransition {
                uri: self.description.root().lexical().to_string(),
                from,
                to,
            });
        }
        self.force_status(to);
        Ok(())
    }

    /// Change status without lifecycle checks.
    pub fn force_status(&mut self, to: Status) {
        self.description.set_property(reg::STATUS, to.iri());
    }

    pub fn entity(&self) -> Option<&Description> {
        self.entity.as_ref()
    }

    pub fn entity_mut(&mut self) -> Option<&mut Description> {
        self.entity.as_mut()
    }

    pub fn set_entity(&mut self, entity: Description) {
        self.entity = Some(entity);
    }

    /// The entity named by this item's `reg:definition`.
    pub fn entity_ref(&self) -> Option<&Term> {
        let graph = self.description.graph();
        graph
            .object(self.description.root(), &reg::DEFINITION)
            .and_then(|def| graph.object(def, &reg::ENTITY))
    }

    /// Pinned sub-register version, for register entities.
    pub fn entity_version(&self) -> Option<&Iri> {
        let graph = self.description.graph();
        graph
            .object(self.description.root(), &reg::DEFINITION)
            .and_then(|def| graph.object(def, &reg::ENTITY_VERSION))
            .and_then(Term::as_iri)
    }

    /// Named graph holding the entity of the described version.
    pub fn source_graph(&self) -> Option<&Iri> {
        let graph = self.description.graph();
        graph
            .object(self.description.root(), &reg::DEFINITION)
            .and_then(|def| graph.object(def, &reg::SOURCE_GRAPH))
            .and_then(Term::as_iri)
    }

    /// True if the managed entity is itself a register.
    pub fn is_register(&self) -> bool {
        self.description
            .graph()
            .contains(self.description.root(), &reg::ITEM_CLASS, &Term::from(reg::REGISTER))
            || self.entity.as_ref().is_some_and(|e| e.has_type(&reg::REGISTER))
    }

    /// Store the entity only in its named graph, without mirroring it into
    /// the default graph.
    pub fn is_graph(&self) -> bool {
        self.as_graph
    }

    pub fn set_as_graph(&mut self, as_graph: bool) {
        self.as_graph = as_graph;
    }

    /// Refresh label, description, item class and timestamps from the entity.
    pub fn update_for_entity(&mut self, is_new: bool, at: DateTime<Utc>) {
        if is_new {
            self.description.set_timestamp(dct::DATE_SUBMITTED, at);
            if !self.description.has_property(&reg::STATUS) {
                self.force_status(Status::Submitted);
            }
        } else {
            self.description.set_timestamp(dct::MODIFIED, at);
        }
        if !self.description.has_property(&reg::NOTATION) {
            if let Some(n) = self.notation.clone() {
                self.description.add_property(reg::NOTATION, Literal::string(n));
            }
        }

        let Some(entity) = &self.entity else {
            return;
        };
        let labels: Vec<Term> = LABEL_PROPERTIES
            .iter()
            .map(|p| entity.values(p).cloned().collect::<Vec<_>>())
            .find(|values| !values.is_empty())
            .unwrap_or_default();
        let descriptions: Vec<Term> = entity.values(&dct::DESCRIPTION).cloned().collect();
        let types: Vec<Term> = entity.types().cloned().collect();

        let d = &mut self.description;
        d.remove_property(&rdfs::LABEL);
        d.remove_property(&dct::DESCRIPTION);
        d.remove_property(&reg::ITEM_CLASS);
        for label in labels {
            d.add_property(rdfs::LABEL, label);
        }
        for text in descriptions {
            d.add_property(dct::DESCRIPTION, text);
        }
        for class in types {
            d.add_property(reg::ITEM_CLASS, class);
        }
    }
}

/// Notation of an item payload: an explicit `reg:notation` first, then
/// the `_n` path of an item URI inside the register, else a generated one.
/// The two must agree when both are given.
fn resolve_item_notation(payload: &Graph, item: &Term, register: &Iri) -> ModelResult<String> {
    let explicit = match payload.object(item, &reg::NOTATION) {
        Some(n) => {
            notation::validate(n.lexical())?;
            Some(n.lexical().to_string())
        }
        None => None,
    };
    let from_path = match item {
        Term::Iri(uri) => match notation::relative_path(uri, register) {
            Some(path) => match path.strip_prefix(notation::ITEM_PREFIX) {
                Some(n) => Some(n.to_string()),
                None => {
                    return Err(ModelError::invalid_notation(
                        path,
                        "item path must start with '_'",
                    ))
                }
            },
            // an explicit notation relocates the item into the register
            None if explicit.is_some() => None,
            None => {
                return Err(ModelError::invalid_notation(
                    uri.as_str(),
                    "item URI lies outside the target register",
                ))
            }
        },
        _ => None,
    };
    let notation = match (explicit, from_path) {
        (Some(explicit), Some(path)) if explicit != path => {
            return Err(ModelError::invalid_notation(
                explicit,
                format!("item URI names notation '{}'", path),
            ))
        }
        (Some(explicit), _) => explicit,
        (None, Some(path)) => path,
        (None, None) => notation::generate(),
    };
    notation::validate(&notation)?;
    Ok(notation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::BlankNode;
    use chrono::TimeZone;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 5, 1, 12, 0, 0).unwrap()
    }

    fn colour(uri: Term, label: &str) -> Graph {
        let mut g = Graph::new();
        g.insert(uri.clone(), rdf::TYPE, iri("http://example.com/def/Colour"));
        g.insert(uri.clone(), skos::PREF_LABEL, Literal::lang(label, "en"));
        g.insert(uri, rdfs::LABEL, Literal::string("fallback"));
        g
    }

    #[test]
    fn test_from_entity_request_relative() {
        let reg1 = iri("http://example.com/reg1");
        let red = Term::from(iri("http://example.com/reg1/red"));
        let item = RegisterItem::from_entity_request(&colour(red.clone(), "red"), &red, &reg1, true, now()).unwrap();

        assert_eq!(item.uri(), Some(&iri("http://example.com/reg1/_red")));
        assert_eq!(item.notation(), Some("red"));
        assert_eq!(item.status(), Status::Submitted);
        assert!(item.description().has_property(&dct::DATE_SUBMITTED));
        // skos:prefLabel wins over rdfs:label
        let labels: Vec<&str> = item.description().values(&rdfs::LABEL).map(Term::lexical).collect();
        assert_eq!(labels, vec!["red"]);
        assert!(item
            .description()
            .graph()
            .contains(item.description().root(), &reg::ITEM_CLASS, &iri("http://example.com/def/Colour").into()));
        assert_eq!(item.entity().and_then(Description::uri), Some(&iri("http://example.com/reg1/red")));
    }

    #[test]
    fn test_from_entity_request_blank_is_relocated() {
        let reg1 = iri("http://example.com/reg1/");
        let b = Term::Blank(BlankNode::new("e").unwrap());
        let item = RegisterItem::from_entity_request(&colour(b.clone(), "blue"), &b, &reg1, true, now()).unwrap();
        let notation = item.notation().unwrap().to_string();
        let entity = item.entity().unwrap();
        assert_eq!(
            entity.uri().map(Iri::as_str),
            Some(format!("http://example.com/reg1/{}", notation).as_str())
        );
        assert_eq!(entity.lexical_value(&skos::PREF_LABEL), Some("blue"));
    }

    #[test]
    fn test_from_entity_request_absolute_keeps_uri() {
        let reg1 = iri("http://example.com/reg1");
        let e = Term::from(iri("http://other.org/thing"));
        let item = RegisterItem::from_entity_request(&colour(e.clone(), "x"), &e, &reg1, true, now()).unwrap();
        assert_eq!(item.entity().and_then(Description::uri), Some(&iri("http://other.org/thing")));
        assert!(item.uri().unwrap().as_str().starts_with("http://example.com/reg1/_"));
    }

    #[test]
    fn test_from_item_request_checks_entity_path() {
        let reg1 = iri("http://example.com/reg1");
        let item_t = Term::from(iri("http://example.com/reg1/_red"));
        let def = Term::Blank(BlankNode::new("d").unwrap());
        let mut g = colour(Term::from(iri("http://example.com/reg1/blue")), "blue");
        g.insert(item_t.clone(), rdf::TYPE, reg::REGISTER_ITEM);
        g.insert(item_t.clone(), reg::DEFINITION, def.clone());
        g.insert(def, reg::ENTITY, iri("http://example.com/reg1/blue"));

        let err = RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).unwrap_err();
        assert!(matches!(err, ModelError::InconsistentEntity { .. }));
    }

    #[test]
    fn test_from_item_request_without_entity() {
        let reg1 = iri("http://example.com/reg1");
        let item_t = Term::from(iri("http://example.com/reg1/_red"));
        let mut g = Graph::new();
        g.insert(item_t.clone(), rdf::TYPE, reg::REGISTER_ITEM);
        assert!(RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).is_err());
    }

    #[test]
    fn test_from_item_request_rejects_bad_path() {
        let reg1 = iri("http://example.com/reg1");
        let item_t = Term::from(iri("http://example.com/reg1/red"));
        let def = Term::Blank(BlankNode::new("d").unwrap());
        let mut g = colour(Term::from(iri("http://example.com/reg1/red")), "red");
        g.insert(item_t.clone(), reg::DEFINITION, def.clone());
        g.insert(def, reg::ENTITY, iri("http://example.com/reg1/red"));
        let err = RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidNotation { .. }));
    }

    fn item_payload(item: &Term, notation: Option<&str>, entity: &str) -> Graph {
        let def = Term::Blank(BlankNode::new("d").unwrap());
        let mut g = colour(Term::from(iri(entity)), "crimson");
        g.insert(item.clone(), rdf::TYPE, reg::REGISTER_ITEM);
        if let Some(n) = notation {
            g.insert(item.clone(), reg::NOTATION, Literal::string(n));
        }
        g.insert(item.clone(), reg::DEFINITION, def.clone());
        g.insert(def, reg::ENTITY, iri(entity));
        g
    }

    #[test]
    fn test_explicit_notation_must_match_item_path() {
        let reg1 = iri("http://example.com/reg1");
        let item_t = Term::from(iri("http://example.com/reg1/_red"));
        let g = item_payload(&item_t, Some("crimson"), "http://example.com/reg1/crimson");
        let err = RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidNotation { .. }));

        let g = item_payload(&item_t, Some("red"), "http://example.com/reg1/red");
        let item = RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).unwrap();
        assert_eq!(item.notation(), Some("red"));
    }

    #[test]
    fn test_explicit_notation_places_item() {
        let reg1 = iri("http://example.com/reg1");
        let item_t = Term::Blank(BlankNode::new("i").unwrap());
        let g = item_payload(&item_t, Some("crimson"), "http://example.com/reg1/crimson");
        let item = RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).unwrap();
        assert_eq!(item.uri(), Some(&iri("http://example.com/reg1/_crimson")));
        assert_eq!(item.notation(), Some("crimson"));
        let notations: Vec<&str> = item.description().values(&reg::NOTATION).map(Term::lexical).collect();
        assert_eq!(notations, vec!["crimson"]);
        assert_eq!(
            item.entity().and_then(Description::uri),
            Some(&iri("http://example.com/reg1/crimson"))
        );

        // an item URI outside the register moves to the explicit notation
        let outside = Term::from(iri("http://other.org/item"));
        let g = item_payload(&outside, Some("crimson"), "http://example.com/reg1/crimson");
        let item = RegisterItem::from_item_request(&g, &outside, &reg1, true, now()).unwrap();
        assert_eq!(item.uri(), Some(&iri("http://example.com/reg1/_crimson")));
    }

    #[test]
    fn test_explicit_notation_is_validated() {
        let reg1 = iri("http://example.com/reg1");
        let item_t = Term::Blank(BlankNode::new("i").unwrap());
        let g = item_payload(&item_t, Some("_crimson"), "http://example.com/reg1/crimson");
        let err = RegisterItem::from_item_request(&g, &item_t, &reg1, true, now()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidNotation { .. }));
    }

    #[test]
    fn test_status_lifecycle() {
        let reg1 = iri("http://example.com/reg1");
        let red = Term::from(iri("http://example.com/reg1/red"));
        let mut item = RegisterItem::from_entity_request(&colour(red.clone(), "red"), &red, &reg1, true, now()).unwrap();
        assert!(item.set_status(Status::Retired).is_err());
        item.set_status(Status::Stable).unwrap();
        assert_eq!(item.status(), Status::Stable);
        item.force_status(Status::Submitted);
        assert_eq!(item.status(), Status::Submitted);
    }
}
