//! Per-resource update locks.
//!
//! A read-modify-write of one resource spans two store transactions (read
//! the current state, write the next version). The lock table serializes
//! those sequences per URI:
//!
//! ```text
//!   thread A: lock(u) ── read u:N ── write u:N+1 ── drop guard
//!   thread B:     lock(u) ......waits...........── read u:N+1 ── ...
//! ```
//!
//! Locks are reentrant for the owning thread and entries are reclaimed as
//! soon as nobody holds or waits for them.

mod table;

pub use table::{LockError, LockGuard, LockTable};
