//! Storage layer error types
//!
//! Errors raised while loading, persisting or publishing datasets.

use std::path::PathBuf;

use thiserror::Error;

use crate::rdf::RdfError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// the backing file could not be parsed
    #[error("corrupted data in {path}: {source}")]
    CorruptedData {
        path: PathBuf,
        #[source]
        source: RdfError,
    },

    /// no dataset file and `create_if_missing` is off
    #[error("store not initialized: {0}")]
    NotInitialized(PathBuf),

    /// malformed input handed to the store
    #[error("rdf error: {0}")]
    Rdf(#[from] RdfError),

    /// writing the dataset file failed; the published state is unchanged
    #[error("failed to persist dataset to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotInitialized(_))
    }

    /// check if retrying the same operation could succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, StorageError::Persist { .. } | StorageError::Io(_))
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_init = StorageError::NotInitialized(PathBuf::from("/tmp/none.nq"));
        assert!(not_init.is_not_found());
        assert!(!not_init.is_retriable());

        let persist = StorageError::Persist {
            path: PathBuf::from("/tmp/x.nq"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(persist.is_retriable());
        assert!(persist.to_string().contains("/tmp/x.nq"));
    }
}
