//! Registry store error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::{ModelError, Status};
use crate::rdf::RdfError;
use crate::storage::StorageError;
use crate::transaction::TransactionError;

/// Result type for registry store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// the URI has no description
    #[error("not found: {uri}")]
    NotFound { uri: String },

    /// the URI exists but is not the expected kind of resource
    #[error("{uri} is not a {expected}")]
    WrongType { uri: String, expected: &'static str },

    /// an item is already registered at this URI
    #[error("already registered: {uri}")]
    Conflict { uri: String },

    #[error("invalid notation '{notation}': {reason}")]
    InvalidNotation { notation: String, reason: String },

    #[error("inconsistent entity {uri}: {reason}")]
    InconsistentEntity { uri: String, reason: String },

    /// an update tried to rewrite an identity property of a stored root
    #[error("cannot change rigid property {property} of {uri}")]
    RigidPropertyChange { uri: String, property: String },

    #[error("illegal status change for {uri}: {from} -> {to}")]
    IllegalTransition { uri: String, from: Status, to: Status },

    /// a new version would start before the current one did
    #[error("update of {uri} at {at} precedes its current version, started {current}")]
    TimestampRegression {
        uri: String,
        at: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// a request parameter looked like a filter but could not be parsed
    #[error("invalid filter '{key}': {reason}")]
    InvalidFilter { key: String, reason: String },

    /// broken lock discipline or version chain; abort, do not repair
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("rdf error: {0}")]
    Rdf(#[from] RdfError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ModelError> for StoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidNotation { notation, reason } => {
                StoreError::InvalidNotation { notation, reason }
            }
            ModelError::InconsistentEntity { uri, reason } => {
                StoreError::InconsistentEntity { uri, reason }
            }
            ModelError::WrongType { uri, expected } => StoreError::WrongType { uri, expected },
            ModelError::IllegalTransition { uri, from, to } => {
                StoreError::IllegalTransition { uri, from, to }
            }
        }
    }
}

impl StoreError {
    pub fn not_found(uri: impl ToString) -> Self {
        Self::NotFound {
            uri: uri.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalInconsistency(message.into())
    }

    /// Absence, as opposed to a resource of the wrong kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Rejected request data, reportable to the submitter.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidNotation { .. }
                | StoreError::InconsistentEntity { .. }
                | StoreError::RigidPropertyChange { .. }
                | StoreError::TimestampRegression { .. }
                | StoreError::IllegalTransition { .. }
                | StoreError::WrongType { .. }
                | StoreError::InvalidFilter { .. }
        )
    }

    /// Programming-contract violations.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::InternalInconsistency(_))
    }
}
