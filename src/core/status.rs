//! Item lifecycle status.
//!
//! ```text
//! Any
//! ├── NotAccepted: Submitted, Reserved, Invalid
//! └── Accepted
//!     ├── Valid: Stable, Experimental
//!     └── Deprecated: Superseded, Retired
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::rdf::{Iri, Term};
use crate::rdf::vocab::reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Any,
    NotAccepted,
    Submitted,
    Reserved,
    Invalid,
    Accepted,
    Valid,
    Stable,
    Experimental,
    Deprecated,
    Superseded,
    Retired,
}

impl Status {
    pub const ALL: [Status; 12] = [
        Status::Any,
        Status::NotAccepted,
        Status::Submitted,
        Status::Reserved,
        Status::Invalid,
        Status::Accepted,
        Status::Valid,
        Status::Stable,
        Status::Experimental,
        Status::Deprecated,
        Status::Superseded,
        Status::Retired,
    ];

    /// Lowercase label, as used in requests.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Any => "any",
            Status::NotAccepted => "notaccepted",
            Status::Submitted => "submitted",
            Status::Reserved => "reserved",
            Status::Invalid => "invalid",
            Status::Accepted => "accepted",
            Status::Valid => "valid",
            Status::Stable => "stable",
            Status::Experimental => "experimental",
            Status::Deprecated => "deprecated",
            Status::Superseded => "superseded",
            Status::Retired => "retired",
        }
    }

    fn local_name(&self) -> &'static str {
        match self {
            Status::Any => "Any",
            Status::NotAccepted => "NotAccepted",
            Status::Submitted => "Submitted",
            Status::Reserved => "Reserved",
            Status::Invalid => "Invalid",
            Status::Accepted => "Accepted",
            Status::Valid => "Valid",
            Status::Stable => "Stable",
            Status::Experimental => "Experimental",
            Status::Deprecated => "Deprecated",
            Status::Superseded => "Superseded",
            Status::Retired => "Retired",
        }
    }

    /// `reg:statusX`
    pub fn iri(&self) -> Iri {
        match self {
            Status::Any => Iri::from_static("http://purl.org/linked-data/registry#statusAny"),
            Status::NotAccepted => Iri::from_static("http://purl.org/linked-data/registry#statusNotAccepted"),
            Status::Submitted => Iri::from_static("http://purl.org/linked-data/registry#statusSubmitted"),
            Status::Reserved => Iri::from_static("http://purl.org/linked-data/registry#statusReserved"),
            Status::Invalid => Iri::from_static("http://purl.org/linked-data/registry#statusInvalid"),
            Status::Accepted => Iri::from_static("http://purl.org/linked-data/registry#statusAccepted"),
            Status::Valid => Iri::from_static("http://purl.org/linked-data/registry#statusValid"),
            Status::Stable => Iri::from_static("http://purl.org/linked-data/registry#statusStable"),
            Status::Experimental => Iri::from_static("http://purl.org/linked-data/registry#statusExperimental"),
            Status::Deprecated => Iri::from_static("http://purl.org/linked-data/registry#statusDeprecated"),
            Status::Superseded => Iri::from_static("http://purl.org/linked-data/registry#statusSuperseded"),
            Status::Retired => Iri::from_static("http://purl.org/linked-data/registry#statusRetired"),
        }
    }

    pub fn parent(&self) -> Option<Status> {
        match self {
            Status::Any => None,
            Status::NotAccepted | Status::Accepted => Some(Status::Any),
            Status::Submitted | Status::Reserved | Status::Invalid => Some(Status::NotAccepted),
            Status::Valid | Status::Deprecated => Some(Status::Accepted),
            Status::Stable | Status::Experimental => Some(Status::Valid),
            Status::Superseded | Status::Retired => Some(Status::Deprecated),
        }
    }

    /// True if `self` is `ancestor` or one of its specializations.
    pub fn is_a(&self, ancestor: Status) -> bool {
        let mut current = Some(*self);
        while let Some(s) = current {
            if s == ancestor {
                return true;
            }
            current = s.parent();
        }
        false
    }

    pub fn is_accepted(&self) -> bool {
        self.is_a(Status::Accepted)
    }

    /// Statuses reachable in one step under the default lifecycle.
    /// Every status may move to `Invalid`.
    pub fn successors(&self) -> &'static [Status] {
        match self {
            Status::Submitted => &[Status::Stable, Status::Experimental, Status::Invalid],
            Status::Stable => &[Status::Retired, Status::Superseded, Status::Invalid],
            Status::Experimental => &[
                Status::Stable,
                Status::Retired,
                Status::Superseded,
                Status::Invalid,
            ],
            Status::Reserved => &[Status::Submitted, Status::Invalid],
            _ => &[Status::Invalid],
        }
    }

    pub fn legal_next_state(&self, next: Status) -> bool {
        self.successors().contains(&next)
    }

    /// Map a stored status resource back to a status. Unknown resources
    /// count as not accepted.
    pub fn for_resource(term: &Term) -> Status {
        Status::from_term(term).unwrap_or(Status::NotAccepted)
    }

    pub fn from_term(term: &Term) -> Option<Status> {
        let iri = term.as_iri()?;
        let local = iri.as_str().strip_prefix(reg::NS)?.strip_prefix("status")?;
        Status::ALL.into_iter().find(|s| s.local_name() == local)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let lower = lower.strip_prefix("reg:status").unwrap_or(&lower);
        Status::ALL
            .into_iter()
            .find(|st| st.label() == lower)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy() {
        assert!(Status::Stable.is_a(Status::Valid));
        assert!(Status::Stable.is_accepted());
        assert!(Status::Retired.is_a(Status::Deprecated));
        assert!(!Status::Submitted.is_accepted());
        assert!(Status::Invalid.is_a(Status::NotAccepted));
        assert!(Status::Invalid.is_a(Status::Any));
    }

    #[test]
    fn test_lifecycle() {
        assert!(Status::Submitted.legal_next_state(Status::Stable));
        assert!(Status::Reserved.legal_next_state(Status::Submitted));
        assert!(!Status::Submitted.legal_next_state(Status::Retired));
        for s in Status::ALL {
            assert!(s.legal_next_state(Status::Invalid));
        }
    }

    #[test]
    fn test_iri_round_trip() {
        for s in Status::ALL {
            assert_eq!(Status::from_term(&Term::Iri(s.iri())), Some(s));
        }
        assert_eq!(
            Status::Submitted.iri().as_str(),
            "http://purl.org/linked-data/registry#statusSubmitted"
        );
    }

    #[test]
    fn test_for_resource_fallback() {
        let other = Term::Iri(Iri::new("http://example.com/status").unwrap());
        assert_eq!(Status::for_resource(&other), Status::NotAccepted);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Stable".parse::<Status>(), Ok(Status::Stable));
        assert_eq!("reg:statusRetired".parse::<Status>(), Ok(Status::Retired));
        assert!("bogus".parse::<Status>().is_err());
    }
}
