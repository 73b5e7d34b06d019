//! Version chains over a plain graph.
//!
//! A versioned resource keeps only its rigid properties on the root. Every
//! update produces a new version resource `<root>:<n>` carrying all other
//! properties, linked back to the root and to the version it replaces, and
//! an interval recording when it was in force.

mod builder;
mod info;
mod uri;

pub use builder::{flatten, interval_bounds, next_version, version_counter, NextVersion, RigidProperties};
pub use info::VersionInfo;
pub use uri::{graph_uri, interval_uri, is_versioned_uri, split_versioned_uri, versioned_uri};
