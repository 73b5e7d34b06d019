//! Splitting a description into a rigid root and a new version.
//!
//! ```text
//!   <root> rigid...                     <root> rigid...
//!          other...       next_version         version:currentVersion <root:n>
//!                        ───────────>   <root:n> other...
//!                                                owl:versionInfo n
//!                                                dct:isVersionOf <root>
//!                                                dct:replaces <root:n-1>
//!                                                version:interval <root:n#interval>
//! ```
//!
//! `flatten` is the inverse view: it folds a version back onto its root.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::rdf::vocab::{dct, owl, rdf, time, version as ver};
use crate::rdf::{BlankNode, Graph, Iri, Literal, Term};
use crate::version::uri::{interval_uri, split_versioned_uri, versioned_uri};

/// Properties that stay on the root across versions.
///
/// `rdf:type` is always rigid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigidProperties(BTreeSet<Iri>);

impl RigidProperties {
    pub fn new(props: impl IntoIterator<Item = Iri>) -> Self {
        let mut set: BTreeSet<Iri> = props.into_iter().collect();
        set.insert(rdf::TYPE);
        Self(set)
    }

    /// Only `rdf:type`.
    pub fn type_only() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn contains(&self, property: &Iri) -> bool {
        self.0.contains(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Iri> {
        self.0.iter()
    }
}

/// Result of [`next_version`].
#[derive(Debug, Clone)]
pub struct NextVersion {
    pub version: Iri,
    pub ordinal: u64,
    /// Rigid root statements, the root's `currentVersion` link and the
    /// complete new version, ready to be added to the store.
    pub graph: Graph,
}

/// The version counter recorded for `root`: its `owl:versionInfo`, else
/// the ordinal of its `currentVersion`, else 0.
pub fn version_counter(graph: &Graph, root: &Iri) -> u64 {
    let root = Term::from(root);
    if let Some(n) = graph
        .object(&root, &owl::VERSION_INFO)
        .and_then(Term::as_literal)
        .and_then(Literal::as_i64)
    {
        return n.max(0) as u64;
    }
    graph
        .object(&root, &ver::CURRENT_VERSION)
        .and_then(Term::as_iri)
        .and_then(split_versioned_uri)
        .map(|(_, n)| n)
        .unwrap_or(0)
}

/// Build the next version of `root` from its (flattened) description.
pub fn next_version(source: &Graph, root: &Iri, timestamp: DateTime<Utc>, rigid: &RigidProperties) -> NextVersion {
    let counter = version_counter(source, root);
    let ordinal = counter + 1;
    let version = versioned_uri(root, ordinal);
    let root_t = Term::from(root);
    let ver_t = Term::from(&version);
    let mut out = Graph::new();

    for (p, o) in source.properties(&root_t) {
        if *p == owl::VERSION_INFO || *p == ver::CURRENT_VERSION {
            continue;
        }
        let subject = if rigid.contains(p) { &root_t } else { &ver_t };
        let object = if o.is_blank() {
            let fresh = Term::Blank(BlankNode::fresh());
            for (bp, bo) in source.properties(o) {
                out.insert(fresh.clone(), bp.clone(), bo.clone());
            }
            fresh
        } else {
            o.clone()
        };
        out.insert(subject.clone(), p.clone(), object);
    }

    out.insert(ver_t.clone(), owl::VERSION_INFO, Literal::integer(ordinal as i64));
    out.insert(ver_t.clone(), dct::IS_VERSION_OF, root_t.clone());
    let interval = interval_uri(&version);
    out.insert(ver_t.clone(), ver::INTERVAL, interval.clone());
    add_instant(&mut out, &interval, time::HAS_BEGINNING, timestamp);
    out.insert(root_t, ver::CURRENT_VERSION, ver_t.clone());

    if counter > 0 {
        let previous = versioned_uri(root, counter);
        let previous_interval = interval_uri(&previous);
        out.insert(ver_t, dct::REPLACES, previous.clone());
        out.insert(previous, ver::INTERVAL, previous_interval.clone());
        add_instant(&mut out, &previous_interval, time::HAS_END, timestamp);
    }

    NextVersion {
        version,
        ordinal,
        graph: out,
    }
}

fn add_instant(graph: &mut Graph, interval: &Iri, edge: Iri, timestamp: DateTime<Utc>) {
    let instant = Term::Blank(BlankNode::fresh());
    graph.insert(interval.clone(), edge, instant.clone());
    graph.insert(instant, time::IN_XSD_DATE_TIME, Literal::date_time(timestamp));
}

/// Fold `version` onto `root` and drop the versioning links.
pub fn flatten(graph: &mut Graph, root: &Iri, version: &Iri) {
    let root = Term::from(root);
    graph.rename(&Term::from(version), &root);
    for p in [
        ver::CURRENT_VERSION,
        ver::INTERVAL,
        dct::IS_VERSION_OF,
        dct::REPLACES,
    ] {
        graph.remove_all(&root, &p);
    }
}

/// Start and end instants of a version's interval.
pub fn interval_bounds(graph: &Graph, version: &Iri) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let Some(interval) = graph.object(&Term::from(version), &ver::INTERVAL) else {
        return (None, None);
    };
    let instant = |edge: &Iri| {
        graph
            .object(interval, edge)
            .and_then(|node| graph.object(node, &time::IN_XSD_DATE_TIME))
            .and_then(Term::as_literal)
            .and_then(Literal::as_date_time)
    };
    (instant(&time::HAS_BEGINNING), instant(&time::HAS_END))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::{reg, rdfs};
    use chrono::TimeZone;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 3, 1, hour, 0, 0).unwrap()
    }

    fn item_graph(root: &Iri, label: &str) -> Graph {
        let mut g = Graph::new();
        let def = Term::Blank(BlankNode::new("d").unwrap());
        g.insert(root.clone(), rdf::TYPE, reg::REGISTER_ITEM);
        g.insert(root.clone(), reg::NOTATION, Literal::string("red"));
        g.insert(root.clone(), rdfs::LABEL, Literal::string(label));
        g.insert(root.clone(), reg::DEFINITION, def.clone());
        g.insert(def, reg::ENTITY, iri("http://example.com/reg/red"));
        g
    }

    #[test]
    fn test_first_version() {
        let root = iri("http://example.com/reg/_red");
        let rigid = RigidProperties::new([reg::NOTATION]);
        let next = next_version(&item_graph(&root, "red"), &root, ts(1), &rigid);

        assert_eq!(next.ordinal, 1);
        assert_eq!(next.version.as_str(), "http://example.com/reg/_red:1");
        let g = &next.graph;
        let r = Term::from(&root);
        let v = Term::from(&next.version);
        assert!(g.has_property(&r, &rdf::TYPE));
        assert!(g.has_property(&r, &reg::NOTATION));
        assert!(!g.has_property(&r, &rdfs::LABEL));
        assert!(g.has_property(&v, &rdfs::LABEL));
        assert_eq!(g.object(&r, &ver::CURRENT_VERSION), Some(&v));
        assert_eq!(g.object(&v, &dct::IS_VERSION_OF), Some(&r));
        assert!(!g.has_property(&v, &dct::REPLACES));
        assert_eq!(interval_bounds(g, &next.version), (Some(ts(1)), None));

        // the definition blank node is copied, not shared
        let def = g.object(&v, &reg::DEFINITION).unwrap();
        assert_ne!(def, &Term::Blank(BlankNode::new("d").unwrap()));
        assert!(g.has_property(def, &reg::ENTITY));
    }

    #[test]
    fn test_second_version_closes_first() {
        let root = iri("http://example.com/reg/_red");
        let rigid = RigidProperties::new([reg::NOTATION]);
        let mut source = item_graph(&root, "reddish");
        source.insert(root.clone(), owl::VERSION_INFO, Literal::integer(1));

        let next = next_version(&source, &root, ts(2), &rigid);
        assert_eq!(next.ordinal, 2);
        let v = Term::from(&next.version);
        let previous = iri("http://example.com/reg/_red:1");
        assert_eq!(next.graph.object(&v, &dct::REPLACES), Some(&Term::from(&previous)));
        assert_eq!(interval_bounds(&next.graph, &previous), (None, Some(ts(2))));
    }

    #[test]
    fn test_counter_from_current_version() {
        let root = iri("http://example.com/x");
        let mut g = Graph::new();
        g.insert(root.clone(), ver::CURRENT_VERSION, iri("http://example.com/x:4"));
        assert_eq!(version_counter(&g, &root), 4);
        assert_eq!(version_counter(&Graph::new(), &root), 0);
    }

    #[test]
    fn test_flatten_restores_view() {
        let root = iri("http://example.com/reg/_red");
        let rigid = RigidProperties::new([reg::NOTATION]);
        let mut g = next_version(&item_graph(&root, "red"), &root, ts(1), &rigid).graph;
        flatten(&mut g, &root, &iri("http://example.com/reg/_red:1"));

        let r = Term::from(&root);
        assert_eq!(
            g.object(&r, &rdfs::LABEL),
            Some(&Term::from(Literal::string("red")))
        );
        assert_eq!(
            g.object(&r, &owl::VERSION_INFO).and_then(Term::as_literal).and_then(Literal::as_i64),
            Some(1)
        );
        assert!(!g.has_property(&r, &ver::CURRENT_VERSION));
        assert!(!g.has_property(&r, &dct::IS_VERSION_OF));
        assert!(!g.has_property(&r, &ver::INTERVAL));
    }
}
