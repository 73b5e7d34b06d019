//! ldreg - a versioned linked-data registry store
//!
//! Registers, register items and the entities they manage are kept in an
//! RDF dataset. Every change to a resource produces an immutable version
//! (`<uri>:<n>`) linked from the resource's root, so any past state can be
//! read back and whole register trees can be exported and replayed.
//!
//! # Example
//!
//! ```no_run
//! use ldreg::rdf::Iri;
//! use ldreg::store::Store;
//!
//! let store = Store::in_memory();
//! store.load_bootstrap(std::io::BufReader::new(std::fs::File::open("root.nq").unwrap())).unwrap();
//! let root = Iri::new("http://example.com/").unwrap();
//! for member in store.list_members(&root, &[]).unwrap() {
//!     println!("{} {}", member.notation, member.status);
//! }
//! ```

#![allow(dead_code)] // Many methods are for public API extensibility

pub mod cache;
pub mod config;
pub mod core;
pub mod lock;
pub mod rdf;
pub mod storage;
pub mod store;
pub mod transaction;
pub mod version;

pub use config::StoreConfig;
pub use store::{Store, StoreError, StoreResult};
