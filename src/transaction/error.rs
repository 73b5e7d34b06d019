//! Transaction error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors that can occur during transaction operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Transaction was already committed or aborted.
    #[error("transaction {tx_id} is no longer active (state: {state})")]
    NotActive { tx_id: String, state: String },

    /// Invalid operation for current transaction state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl TransactionError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransactionError::Storage(e) => e.is_retriable(),
            _ => false,
        }
    }
}
