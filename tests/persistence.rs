mod common;

use common::{at, bootstrap, concept, iri, ROOT};
use ldreg::rdf::vocab::rdfs;
use ldreg::store::{SearchRequest, Store};
use ldreg::StoreConfig;

#[test]
fn test_reopen_file_backed_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("registry.nq");
    {
        let store = Store::open(StoreConfig::new(&path)).unwrap();
        bootstrap(&store);
        store
            .add_to_register(&iri(ROOT), concept(ROOT, "red", "red", at(1)), at(1))
            .unwrap();
    }
    assert!(path.exists());

    let store = Store::open(StoreConfig::new(&path).create_if_missing(false)).unwrap();
    let item = store.get_item(&iri("http://example.com/_red"), true).unwrap();
    assert_eq!(item.notation(), Some("red"));
    assert_eq!(item.entity().unwrap().lexical_value(&rdfs::LABEL), Some("red"));
    assert_eq!(store.list_versions(&iri("http://example.com/_red")).unwrap().len(), 1);
}

#[test]
fn test_missing_file_without_create_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path().join("absent.nq")).create_if_missing(false);
    assert!(Store::open(config).is_err());
}

#[test]
fn test_search_finds_items_by_entity_text() {
    let store = Store::in_memory();
    bootstrap(&store);
    store
        .add_to_register(&iri(ROOT), concept(ROOT, "red", "Scarlet red", at(1)), at(1))
        .unwrap();
    store
        .add_to_register(&iri(ROOT), concept(ROOT, "blue", "Navy blue", at(2)), at(2))
        .unwrap();

    let hits = store.search(&SearchRequest::new("scarlet")).unwrap();
    assert_eq!(hits, vec![iri("http://example.com/_red")]);

    let none = store
        .search(&SearchRequest::new("navy").status(ldreg::core::Status::Accepted))
        .unwrap();
    assert!(none.is_empty());

    let paged = store
        .search(&SearchRequest::new("e").page(1, Some(1)))
        .unwrap();
    assert_eq!(paged.len(), 1);
}

#[test]
fn test_member_filters() {
    let store = Store::in_memory();
    bootstrap(&store);
    store
        .add_to_register(&iri(ROOT), concept(ROOT, "red", "red", at(1)), at(1))
        .unwrap();
    store
        .add_to_register(&iri(ROOT), concept(ROOT, "blue", "blue", at(2)), at(2))
        .unwrap();

    let filters =
        ldreg::store::FilterSpec::from_params([("rdfs:label", "blue"), ("_view", "with_metadata")])
            .unwrap();
    let members = store.list_members(&iri(ROOT), &filters).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].notation, "blue");

    // ordered by notation
    let all = store.list_members(&iri(ROOT), &[]).unwrap();
    let notations: Vec<&str> = all.iter().map(|m| m.notation.as_str()).collect();
    assert_eq!(notations, vec!["blue", "red"]);
}
