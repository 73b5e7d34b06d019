//! Register description cache.
//!
//! Register descriptions are read on nearly every request and change
//! rarely, so [`CachingStore`] memoizes them in front of a [`Store`]:
//!
//! ```text
//!   get_current_version ──► DescriptionCache ──miss──► Store
//!   write paths ─────────► invalidate(register) ─────► Store
//!   invalidation_hook() ─► Invalidation msgs, applied before next access
//! ```
//!
//! [`Store`]: crate::store::Store

mod caching_store;
mod description_cache;

pub use caching_store::{CachingStore, Invalidation};
pub use description_cache::{DescriptionCache, LruDescriptionCache};
