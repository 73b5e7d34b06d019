//! Write transactions over the graph store.
//!
//! Each write transaction claims the store's single writer slot and stages
//! its changes on a private copy of the latest snapshot. On commit the
//! copy is published; on rollback it is dropped.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TransactionManager                        │
//! │    (begins transactions, tracks active tx, snapshots)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!       ┌─────────────┐                 ┌─────────────┐
//!       │ Transaction │                 │  GraphStore │
//!       │  (staged    │ ── publish ──>  │  (snapshot) │
//!       │   dataset)  │                 │             │
//!       └─────────────┘                 └─────────────┘
//! ```

mod context;
mod error;
mod manager;

pub use context::{Transaction, TransactionMetadata, TxAborted, TxActive, TxCommitted};
pub use error::{TransactionError, TransactionResult};
pub use manager::TransactionManager;
