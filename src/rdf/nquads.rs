//! N-Quads reading and writing over `oxttl`.
//!
//! Blank node labels are kept as written, so a dump read back into a
//! dataset reproduces the same nodes. Callers that merge documents into
//! an existing dataset rename them first (see the store writer).

use std::io::{Read, Write};

use oxttl::nquads::{NQuadsParser, NQuadsSerializer, WriterNQuadsSerializer};

use crate::rdf::error::RdfResult;
use crate::rdf::term::{Iri, Quad, Triple};

/// Streams statements to a writer, one N-Quads line each.
pub struct QuadWriter<W: Write> {
    serializer: WriterNQuadsSerializer<W>,
    count: usize,
}

impl<W: Write> QuadWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            serializer: NQuadsSerializer::new().for_writer(writer),
            count: 0,
        }
    }

    /// Write `triple` into `graph`, or the default graph for `None`.
    pub fn write(&mut self, graph: Option<&Iri>, triple: &Triple) -> RdfResult<()> {
        let quad = triple.to_oxrdf_quad(graph)?;
        self.serializer.serialize_quad(&quad)?;
        self.count += 1;
        Ok(())
    }

    pub fn write_quad(&mut self, quad: &Quad) -> RdfResult<()> {
        self.write(quad.graph.as_ref(), &quad.triple)
    }

    /// Statements written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(self) -> W {
        self.serializer.finish()
    }
}

/// Stream quads from a reader, calling `sink` for each one.
pub fn read_quads<R, F>(reader: R, mut sink: F) -> RdfResult<usize>
where
    R: Read,
    F: FnMut(Quad) -> RdfResult<()>,
{
    let mut count = 0;
    for quad in NQuadsParser::new().for_reader(reader) {
        sink(Quad::try_from(quad?)?)?;
        count += 1;
    }
    Ok(count)
}

/// Parse a whole document.
pub fn parse_str(input: &str) -> RdfResult<Vec<Quad>> {
    let mut quads = Vec::new();
    read_quads(input.as_bytes(), |q| {
        quads.push(q);
        Ok(())
    })?;
    Ok(quads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::error::RdfError;
    use crate::rdf::term::{BlankNode, Literal, Term};

    #[test]
    fn test_parse_triple_and_quad() {
        let doc = r#"
# comment
<http://a> <http://p> "hello" .
<http://a> <http://p> _:b1 <http://g> .
_:b1 <http://q> "5"^^<http://www.w3.org/2001/XMLSchema#integer> .
"#;
        let quads = parse_str(doc).unwrap();
        assert_eq!(quads.len(), 3);
        assert_eq!(quads[0].graph, None);
        assert_eq!(quads[1].graph, Some(Iri::new("http://g").unwrap()));
        assert_eq!(quads[2].triple.subject, Term::Blank(BlankNode::new("b1").unwrap()));
        assert_eq!(quads[2].triple.object.as_literal().and_then(|l| l.as_i64()), Some(5));
    }

    #[test]
    fn test_escapes_survive_writing() {
        let t = Triple::new(
            Iri::new("http://a").unwrap(),
            Iri::new("http://p").unwrap(),
            Literal::string("line \"one\"\nline two\\"),
        );
        let mut writer = QuadWriter::new(Vec::new());
        writer.write(None, &t).unwrap();
        assert_eq!(writer.count(), 1);
        let text = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(text.lines().count(), 1);
        let back = parse_str(&text).unwrap();
        assert_eq!(back[0].triple, t);
    }

    #[test]
    fn test_language_tag() {
        let quads = parse_str(r#"<http://a> <http://p> "rouge"@FR ."#).unwrap();
        let lit = quads[0].triple.object.as_literal().unwrap();
        assert_eq!(lit.language(), Some("fr"));
        assert_eq!(lit.lexical(), "rouge");
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse_str("<http://a> <http://p> \"x\" .\n<http://a> \"p\" <http://b> .").unwrap_err();
        assert!(matches!(err, RdfError::Parse(_)), "unexpected error {err:?}");
        assert!(parse_str("<http://a> <http://p> <http://b>").is_err());
    }

    #[test]
    fn test_literal_subject_not_written() {
        let t = Triple::new(Literal::string("x"), Iri::new("http://p").unwrap(), Literal::string("y"));
        let mut writer = QuadWriter::new(Vec::new());
        assert!(writer.write(None, &t).is_err());
        assert_eq!(writer.count(), 0);
    }
}
