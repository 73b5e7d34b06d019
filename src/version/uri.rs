//! Versioned resource URIs: `<root>:<n>`.

use crate::rdf::Iri;

/// `root:n`
pub fn versioned_uri(root: &Iri, ordinal: u64) -> Iri {
    root.with_suffix(&format!(":{}", ordinal))
}

/// The interval resource attached to a version.
pub fn interval_uri(version: &Iri) -> Iri {
    version.with_suffix("#interval")
}

/// The named graph holding an item version's entity.
pub fn graph_uri(version: &Iri) -> Iri {
    version.with_suffix("#graph")
}

/// Split `root:n` into its parts.
///
/// A port number in the authority (`http://host:8080`) is not a version
/// suffix.
pub fn split_versioned_uri(uri: &Iri) -> Option<(Iri, u64)> {
    let s = uri.as_str();
    let colon = s.rfind(':')?;
    let digits = &s[colon + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let authority_end = match s.find("://") {
        Some(scheme_end) => s[scheme_end + 3..]
            .find('/')
            .map(|i| scheme_end + 3 + i)?,
        None => 0,
    };
    if colon <= authority_end {
        return None;
    }
    let ordinal = digits.parse().ok()?;
    let root = Iri::new(&s[..colon]).ok()?;
    Some((root, ordinal))
}

pub fn is_versioned_uri(uri: &Iri) -> bool {
    split_versioned_uri(uri).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_versioned_uri() {
        let v = versioned_uri(&iri("http://example.com/reg/_item"), 3);
        assert_eq!(v.as_str(), "http://example.com/reg/_item:3");
        assert_eq!(
            split_versioned_uri(&v),
            Some((iri("http://example.com/reg/_item"), 3))
        );
    }

    #[test]
    fn test_port_is_not_a_version() {
        assert!(!is_versioned_uri(&iri("http://example.com:8080")));
        assert!(!is_versioned_uri(&iri("http://example.com:8080/")));
        assert!(is_versioned_uri(&iri("http://example.com:8080/a:2")));
        assert!(!is_versioned_uri(&iri("http://example.com/a:b")));
    }

    #[test]
    fn test_derived_uris() {
        let v = iri("http://example.com/a:1");
        assert_eq!(interval_uri(&v).as_str(), "http://example.com/a:1#interval");
        assert_eq!(graph_uri(&v).as_str(), "http://example.com/a:1#graph");
    }
}
