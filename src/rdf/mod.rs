//! RDF data model: terms, graphs, vocabulary and the N-Quads codec.

pub mod error;
pub mod graph;
pub mod nquads;
pub mod term;
pub mod vocab;

pub use error::{RdfError, RdfResult};
pub use graph::Graph;
pub use term::{BlankNode, Iri, Literal, Quad, Term, Triple};
