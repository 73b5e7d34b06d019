//! Vocabulary constants.
//!
//! One module per namespace. Every constant is a static [`Iri`].

use crate::rdf::term::Iri;

pub mod rdf {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: Iri = Iri::from_static("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    pub const LANG_STRING: Iri =
        Iri::from_static("http://www.w3.org/1999/02/22-rdf-syntax-ns#langString");
}

pub mod rdfs {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#label");
    pub const MEMBER: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#member");
}

pub mod owl {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
    pub const VERSION_INFO: Iri = Iri::from_static("http://www.w3.org/2002/07/owl#versionInfo");
}

pub mod xsd {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#string");
    pub const INTEGER: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#integer");
    pub const DECIMAL: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#decimal");
    pub const DOUBLE: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#double");
    pub const BOOLEAN: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#boolean");
    pub const DATE_TIME: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#dateTime");

    pub fn is_numeric(datatype: &Iri) -> bool {
        *datatype == INTEGER
            || *datatype == DECIMAL
            || *datatype == DOUBLE
            || datatype.as_str() == "http://www.w3.org/2001/XMLSchema#int"
            || datatype.as_str() == "http://www.w3.org/2001/XMLSchema#long"
            || datatype.as_str() == "http://www.w3.org/2001/XMLSchema#float"
    }
}

pub mod skos {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";
    pub const PREF_LABEL: Iri = Iri::from_static("http://www.w3.org/2004/02/skos/core#prefLabel");
    pub const ALT_LABEL: Iri = Iri::from_static("http://www.w3.org/2004/02/skos/core#altLabel");
    pub const NOTATION: Iri = Iri::from_static("http://www.w3.org/2004/02/skos/core#notation");
    pub const CONCEPT: Iri = Iri::from_static("http://www.w3.org/2004/02/skos/core#Concept");
}

pub mod dct {
    use super::Iri;

    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const IS_VERSION_OF: Iri = Iri::from_static("http://purl.org/dc/terms/isVersionOf");
    pub const REPLACES: Iri = Iri::from_static("http://purl.org/dc/terms/replaces");
    pub const DESCRIPTION: Iri = Iri::from_static("http://purl.org/dc/terms/description");
    pub const DATE_SUBMITTED: Iri = Iri::from_static("http://purl.org/dc/terms/dateSubmitted");
    pub const MODIFIED: Iri = Iri::from_static("http://purl.org/dc/terms/modified");
}

pub mod time {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/2006/time#";
    pub const HAS_BEGINNING: Iri = Iri::from_static("http://www.w3.org/2006/time#hasBeginning");
    pub const HAS_END: Iri = Iri::from_static("http://www.w3.org/2006/time#hasEnd");
    pub const IN_XSD_DATE_TIME: Iri =
        Iri::from_static("http://www.w3.org/2006/time#inXSDDateTime");
}

/// Versioning vocabulary.
pub mod version {
    use super::Iri;

    pub const NS: &str = "http://purl.org/linked-data/version#";
    pub const CURRENT_VERSION: Iri =
        Iri::from_static("http://purl.org/linked-data/version#currentVersion");
    pub const INTERVAL: Iri = Iri::from_static("http://purl.org/linked-data/version#interval");
}

pub mod ldp {
    use super::Iri;

    pub const NS: &str = "http://www.w3.org/ns/ldp#";
    pub const MEMBERSHIP_PREDICATE: Iri =
        Iri::from_static("http://www.w3.org/ns/ldp#membershipPredicate");
}

/// Registry vocabulary.
pub mod reg {
    use super::Iri;

    pub const NS: &str = "http://purl.org/linked-data/registry#";

    pub const REGISTER: Iri = Iri::from_static("http://purl.org/linked-data/registry#Register");
    pub const REGISTER_ITEM: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#RegisterItem");

    pub const DEFINITION: Iri = Iri::from_static("http://purl.org/linked-data/registry#definition");
    pub const ENTITY: Iri = Iri::from_static("http://purl.org/linked-data/registry#entity");
    pub const ENTITY_VERSION: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#entityVersion");
    pub const SOURCE_GRAPH: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#sourceGraph");
    pub const ANNOTATION: Iri = Iri::from_static("http://purl.org/linked-data/registry#annotation");

    pub const REGISTER_PROP: Iri = Iri::from_static("http://purl.org/linked-data/registry#register");
    pub const SUBREGISTER: Iri = Iri::from_static("http://purl.org/linked-data/registry#subregister");
    pub const NOTATION: Iri = Iri::from_static("http://purl.org/linked-data/registry#notation");
    pub const ITEM_CLASS: Iri = Iri::from_static("http://purl.org/linked-data/registry#itemClass");
    pub const STATUS: Iri = Iri::from_static("http://purl.org/linked-data/registry#status");
    pub const SUBMITTER: Iri = Iri::from_static("http://purl.org/linked-data/registry#submitter");
    pub const PREDECESSOR: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#predecessor");
    pub const INVERSE_MEMBERSHIP_PREDICATE: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#inverseMembershipPredicate");

    pub const DELEGATED: Iri = Iri::from_static("http://purl.org/linked-data/registry#Delegated");
    pub const DELEGATED_REGISTER: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#DelegatedRegister");
    pub const FEDERATED_REGISTER: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#FederatedRegister");
    pub const DELEGATION_TARGET: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#delegationTarget");
    pub const FORWARDING_CODE: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#forwardingCode");
    pub const ENUMERATION_SUBJECT: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#enumerationSubject");
    pub const ENUMERATION_PREDICATE: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#enumerationPredicate");
    pub const ENUMERATION_OBJECT: Iri =
        Iri::from_static("http://purl.org/linked-data/registry#enumerationObject");
}

/// Expand a `prefix:local` name over the namespaces above.
pub fn expand_prefixed(name: &str) -> Option<Iri> {
    let (prefix, local) = name.split_once(':')?;
    let ns = match prefix {
        "rdf" => rdf::NS,
        "rdfs" => rdfs::NS,
        "owl" => owl::NS,
        "xsd" => xsd::NS,
        "skos" => skos::NS,
        "dct" => dct::NS,
        "time" => time::NS,
        "version" => version::NS,
        "ldp" => ldp::NS,
        "reg" => reg::NS,
        _ => return None,
    };
    Iri::new(format!("{}{}", ns, local)).ok()
}
