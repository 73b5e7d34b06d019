//! Item notations and the URIs derived from them.
//!
//! For a register `R` and notation `n`:
//!
//! ```text
//!   item   R/_n
//!   entity R/n
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::{ModelError, ModelResult};
use crate::rdf::Iri;

const LEGAL_NOTATION_PATTERN: &str = r"^[a-zA-Z0-9\.\-~%@=!&'()*+,;=][\w\.\-~%@=!&'()*+,;=]*$";

static LEGAL_NOTATION: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(LEGAL_NOTATION_PATTERN));

/// Reserved first character of item path segments.
pub const ITEM_PREFIX: char = '_';

/// The register URI without any trailing `/`.
pub fn base(register: &Iri) -> &str {
    register.as_str().trim_end_matches('/')
}

pub fn validate(notation: &str) -> ModelResult<()> {
    if notation.starts_with(ITEM_PREFIX) {
        return Err(ModelError::invalid_notation(notation, "must not start with '_'"));
    }
    let legal = LEGAL_NOTATION
        .as_ref()
        .map_err(|e| ModelError::invalid_notation(notation, e.to_string()))?;
    if !legal.is_match(notation) {
        return Err(ModelError::invalid_notation(notation, "contains illegal characters"));
    }
    Ok(())
}

/// Opaque notation for submissions that do not name themselves.
pub fn generate() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

pub fn item_uri(register: &Iri, notation: &str) -> ModelResult<Iri> {
    Iri::new(format!("{}/{}{}", base(register), ITEM_PREFIX, notation))
        .map_err(|e| ModelError::invalid_notation(notation, e.to_string()))
}

pub fn entity_uri(register: &Iri, notation: &str) -> ModelResult<Iri> {
    Iri::new(format!("{}/{}", base(register), notation))
        .map_err(|e| ModelError::invalid_notation(notation, e.to_string()))
}

/// The path of `uri` below `register`, if it lies inside it.
pub fn relative_path<'a>(uri: &'a Iri, register: &Iri) -> Option<&'a str> {
    let rest = uri.as_str().strip_prefix(base(register))?.strip_prefix('/')?;
    (!rest.is_empty()).then_some(rest)
}

/// Map an entity or item URI to the item URI: `R/x` becomes `R/_x`,
/// `R/_x` is returned unchanged.
pub fn as_item_uri(uri: &Iri) -> Option<Iri> {
    let trimmed = uri.as_str().trim_end_matches('/');
    let (parent, last) = trimmed.rsplit_once('/')?;
    if last.is_empty() || parent.ends_with('/') {
        // nothing but an authority, e.g. http://example.com
        return None;
    }
    if last.starts_with(ITEM_PREFIX) {
        return Iri::new(trimmed).ok();
    }
    Iri::new(format!("{}/{}{}", parent, ITEM_PREFIX, last)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(validate("red").is_ok());
        assert!(validate("1.2-x~y").is_ok());
        assert!(validate("_red").is_err());
        assert!(validate("a/b").is_err());
        assert!(validate("").is_err());
        assert!(validate(&generate()).is_ok());
    }

    #[test]
    fn test_uris_strip_trailing_slash() {
        let root = iri("http://example.com/");
        assert_eq!(item_uri(&root, "reg1").unwrap().as_str(), "http://example.com/_reg1");
        assert_eq!(entity_uri(&root, "reg1").unwrap().as_str(), "http://example.com/reg1");
        let reg = iri("http://example.com/reg1");
        assert_eq!(item_uri(&reg, "red").unwrap().as_str(), "http://example.com/reg1/_red");
    }

    #[test]
    fn test_relative_path() {
        let reg = iri("http://example.com/reg1");
        assert_eq!(relative_path(&iri("http://example.com/reg1/red"), &reg), Some("red"));
        assert_eq!(relative_path(&iri("http://example.com/reg1"), &reg), None);
        assert_eq!(relative_path(&iri("http://other.org/red"), &reg), None);
    }

    #[test]
    fn test_as_item_uri() {
        assert_eq!(
            as_item_uri(&iri("http://example.com/reg1/red")),
            Some(iri("http://example.com/reg1/_red"))
        );
        assert_eq!(
            as_item_uri(&iri("http://example.com/reg1/_red")),
            Some(iri("http://example.com/reg1/_red"))
        );
        assert_eq!(as_item_uri(&iri("http://example.com/reg1")), Some(iri("http://example.com/_reg1")));
        assert_eq!(as_item_uri(&iri("http://example.com/")), None);
    }
}
