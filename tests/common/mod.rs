#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ldreg::core::RegisterItem;
use ldreg::rdf::vocab::{rdf, rdfs, reg, skos};
use ldreg::rdf::{Graph, Iri, Literal, Term};
use ldreg::store::Store;

pub const ROOT: &str = "http://example.com/";

pub fn iri(s: &str) -> Iri {
    Iri::new(s).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn bootstrap(store: &Store) {
    let data = format!(
        "<{}> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://purl.org/linked-data/registry#Register> .\n\
         <{}> <http://www.w3.org/2000/01/rdf-schema#label> \"root\" .\n",
        ROOT, ROOT
    );
    store.load_bootstrap(data.as_bytes()).unwrap();
}

/// Item request for an entity `<register><local>` with a label.
pub fn concept(register: &str, local: &str, label: &str, when: DateTime<Utc>) -> RegisterItem {
    let entity = iri(&format!("{}{}", with_slash(register), local));
    let mut payload = Graph::new();
    payload.insert(entity.clone(), rdf::TYPE, skos::CONCEPT);
    payload.insert(entity.clone(), rdfs::LABEL, Literal::string(label));
    RegisterItem::from_entity_request(&payload, &Term::from(entity), &iri(register), true, when).unwrap()
}

/// Item request for a sub-register `<register><local>`.
pub fn subregister(register: &str, local: &str, when: DateTime<Utc>) -> RegisterItem {
    let entity = iri(&format!("{}{}", with_slash(register), local));
    let mut payload = Graph::new();
    payload.insert(entity.clone(), rdf::TYPE, reg::REGISTER);
    payload.insert(entity.clone(), rdfs::LABEL, Literal::string(local));
    RegisterItem::from_entity_request(&payload, &Term::from(entity), &iri(register), true, when).unwrap()
}

fn with_slash(register: &str) -> String {
    if register.ends_with('/') {
        register.to_string()
    } else {
        format!("{}/", register)
    }
}

/// Root register with `/reg1` holding `/reg1/_red`.
pub fn populated() -> Store {
    let store = Store::in_memory();
    bootstrap(&store);
    store
        .add_to_register(&iri(ROOT), subregister(ROOT, "reg1", at(0)), at(0))
        .unwrap();
    store
        .add_to_register(
            &iri("http://example.com/reg1"),
            concept("http://example.com/reg1", "red", "red", at(1)),
            at(1),
        )
        .unwrap();
    store
}
