//! Destinations for tree export.
//!
//! An export is a stream of default-graph triples and named-graph quads.
//! The N-Quads sink writes to any `Write`; wrap it in a compressor for
//! archival.

use std::io::Write;

use crate::rdf::nquads::QuadWriter;
use crate::rdf::{Iri, Quad, Triple};
use crate::storage::Dataset;
use crate::store::error::StoreResult;

pub trait TreeSink {
    /// A default-graph statement.
    fn triple(&mut self, triple: &Triple) -> StoreResult<()>;

    /// A statement of a named graph.
    fn quad(&mut self, graph: &Iri, triple: &Triple) -> StoreResult<()>;

    fn finish(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

/// Streams N-Quads lines to a writer.
pub struct NQuadsSink<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> NQuadsSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Statements written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> NQuadsSink<W> {
    fn write(&mut self, graph: Option<&Iri>, triple: &Triple) -> StoreResult<()> {
        QuadWriter::new(&mut self.writer).write(graph, triple)?;
        self.count += 1;
        Ok(())
    }
}

impl<W: Write> TreeSink for NQuadsSink<W> {
    fn triple(&mut self, triple: &Triple) -> StoreResult<()> {
        self.write(None, triple)
    }

    fn quad(&mut self, graph: &Iri, triple: &Triple) -> StoreResult<()> {
        self.write(Some(graph), triple)
    }

    fn finish(&mut self) -> StoreResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects an export in memory.
#[derive(Debug, Default)]
pub struct DatasetSink {
    dataset: Dataset,
}

impl DatasetSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

impl TreeSink for DatasetSink {
    fn triple(&mut self, triple: &Triple) -> StoreResult<()> {
        self.dataset.insert_quad(Quad::new(None, triple.clone()));
        Ok(())
    }

    fn quad(&mut self, graph: &Iri, triple: &Triple) -> StoreResult<()> {
        self.dataset
            .insert_quad(Quad::new(Some(graph.clone()), triple.clone()));
        Ok(())
    }
}
