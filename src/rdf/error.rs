//! RDF layer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RdfError {
    #[error("invalid IRI '{iri}': {reason}")]
    InvalidIri { iri: String, reason: String },

    #[error("invalid term {term}: {reason}")]
    InvalidTerm { term: String, reason: String },

    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("N-Quads parse error: {0}")]
    Parse(#[from] oxttl::TurtleParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RdfError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

pub type RdfResult<T> = Result<T, RdfError>;
