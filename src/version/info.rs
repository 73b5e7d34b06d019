use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::rdf::Iri;

/// One entry of a resource's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub uri: Iri,
    pub version: u64,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub replaces: Option<Iri>,
}

impl VersionInfo {
    /// Open-ended interval.
    pub fn is_current(&self) -> bool {
        self.to.is_none()
    }

    /// True if the version was in force at `at`: started at or before it
    /// and not yet ended.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        let started = self.from.is_some_and(|from| from <= at);
        let ended = self.to.is_some_and(|to| to <= at);
        started && !ended
    }
}
