//! Model validation errors.

use thiserror::Error;

use crate::core::status::Status;

#[derive(Debug, Error)]
pub enum ModelError {
    /// the notation fails the legal-character pattern or starts with `_`
    #[error("invalid notation '{notation}': {reason}")]
    InvalidNotation { notation: String, reason: String },

    /// entity URI and notation disagree, or a required entity link is missing
    #[error("inconsistent entity {uri}: {reason}")]
    InconsistentEntity { uri: String, reason: String },

    /// the resource exists but has the wrong type
    #[error("{uri} is not a {expected}")]
    WrongType { uri: String, expected: &'static str },

    /// the status change is not allowed by the lifecycle
    #[error("illegal status change for {uri}: {from} -> {to}")]
    IllegalTransition { uri: String, from: Status, to: Status },
}

impl ModelError {
    pub fn invalid_notation(notation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNotation {
            notation: notation.into(),
            reason: reason.into(),
        }
    }

    pub fn inconsistent(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentEntity {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
