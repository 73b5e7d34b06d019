//! storage layer for the registry
//!
//! A quad store with snapshot reads and a single serialized writer. The
//! upper layers (transactions, registry store) use this API and never
//! touch the dataset file directly.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       GraphStore                            │
//! │   (published Arc<Dataset>, writer slot, N-Quads file)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!       ┌─────────────┐                 ┌─────────────┐
//!       │   dataset   │                 │    query    │
//!       │ (default +  │                 │ (basic graph│
//!       │   named)    │                 │  patterns)  │
//!       └─────────────┘                 └─────────────┘
//! ```

mod dataset;
mod error;
pub mod query;
mod store;

pub use dataset::Dataset;
pub use error::{StorageError, StorageResult};
pub use query::{Bindings, CompareOp, Condition, Node, Query, TriplePattern};
pub use store::GraphStore;
pub(crate) use store::WriterPermit;
