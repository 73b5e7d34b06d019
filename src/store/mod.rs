//! Registry store: the read and write transactions over the graph store.
//!
//! ```text
//!   ┌──────────────────────────── Store ───────────────────────────┐
//!   │  read(|StoreReader| ..)          write(|StoreWriter| ..)     │
//!   │   describe, versions,             add_to_register, update,   │
//!   │   members, search, export         delete, import             │
//!   └──────────┬───────────────────────────────┬───────────────────┘
//!              │ snapshot                      │ Transaction<TxActive>
//!              ▼                               ▼
//!   ┌──────────────────────── TransactionManager ──────────────────┐
//!   │                          GraphStore                          │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read-modify-write sequences that span both sides take the per-resource
//! update lock first, see [`Store::update_item_with`].

mod api;
mod entry;
mod error;
mod export;
mod filter;
mod reader;
mod search;
mod writer;

pub use api::{Store, StoreStats};
pub use entry::{DelegationKind, DelegationRecord, EntityInfo, RegisterEntryInfo};
pub use error::{StoreError, StoreResult};
pub use export::{DatasetSink, NQuadsSink, TreeSink};
pub use filter::{apply_all, FilterSpec};
pub use reader::{BatchEntry, ItemBatch, StoreReader};
pub use search::{LiteralTextIndex, SearchRequest, TextIndex};
pub use writer::StoreWriter;
