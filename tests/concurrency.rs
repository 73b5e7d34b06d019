mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use common::{iri, populated};
use ldreg::rdf::vocab::dct;
use ldreg::rdf::Literal;

#[test]
fn test_concurrent_updates_never_reuse_an_ordinal() {
    let store = Arc::new(populated());
    let red_item = iri("http://example.com/reg1/_red");

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            let red_item = red_item.clone();
            thread::spawn(move || {
                for i in 0..5 {
                    store
                        .update_item_with(&red_item, false, |item| {
                            item.description_mut().set_property(
                                dct::DESCRIPTION,
                                Literal::string(format!("thread {} edit {}", t, i)),
                            );
                            Ok(())
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let versions = store.list_versions(&red_item).unwrap();
    let ordinals: BTreeSet<u64> = versions.iter().map(|v| v.version).collect();
    assert_eq!(versions.len(), 21);
    assert_eq!(ordinals, (1..=21).collect());
    assert_eq!(versions.iter().filter(|v| v.is_current()).count(), 1);
    assert_eq!(store.locks().held_count(), 0);
}

#[test]
fn test_readers_see_committed_state_only() {
    let store = populated();
    let red_item = iri("http://example.com/reg1/_red");
    let snapshot_versions = store.read(|reader| {
        // a write committed while this snapshot is held stays invisible
        let writer = store.clone();
        let red = red_item.clone();
        thread::spawn(move || {
            writer
                .update_item_with(&red, false, |_| Ok(()))
                .unwrap();
        })
        .join()
        .unwrap();
        reader.list_versions(&red_item).unwrap().len()
    });
    assert_eq!(snapshot_versions, 1);
    assert_eq!(store.list_versions(&red_item).unwrap().len(), 2);
}

#[test]
fn test_lock_guard_released_on_error() {
    let store = populated();
    let missing = iri("http://example.com/reg1/_none");
    let err = store
        .update_item_with(&missing, false, |_| Ok(()))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!store.locks().is_locked(missing.as_str()));

    store.locks().acquire("http://example.com/reg1");
    assert!(store.locks().is_locked("http://example.com/reg1"));
    store.unlock("http://example.com/reg1").unwrap();
    assert!(store.unlock("http://example.com/reg1").unwrap_err().is_fatal());
}
