use thiserror::Error;

/// Errors from a single document store operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The connection dropped or the server is failing over; retrying may succeed
    #[error("Connection lost, reconnecting: {0}")]
    Reconnecting(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StoreError {
    /// Whether the operation should be retried rather than abandoned
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Reconnecting(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Tagged result of one attempt at a store operation
#[derive(Debug)]
pub enum OperationOutcome<T> {
    Success(T),
    Transient(StoreError),
    Permanent(StoreError),
}

impl<T> From<StoreResult<T>> for OperationOutcome<T> {
    fn from(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => OperationOutcome::Success(value),
            Err(err) if err.is_transient() => OperationOutcome::Transient(err),
            Err(err) => OperationOutcome::Permanent(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_reconnecting_is_transient() {
        assert!(StoreError::Reconnecting("socket closed".into()).is_transient());
        assert!(!StoreError::DuplicateKey("web01".into()).is_transient());
        assert!(!StoreError::InvalidDocument("bad".into()).is_transient());
        assert!(!StoreError::BackendError("boom".into()).is_transient());
    }

    #[test]
    fn test_outcome_from_result() {
        assert!(matches!(
            OperationOutcome::from(Ok::<_, StoreError>(7)),
            OperationOutcome::Success(7)
        ));
        assert!(matches!(
            OperationOutcome::<()>::from(Err(StoreError::Reconnecting("x".into()))),
            OperationOutcome::Transient(_)
        ));
        assert!(matches!(
            OperationOutcome::<()>::from(Err(StoreError::DuplicateKey("x".into()))),
            OperationOutcome::Permanent(_)
        ));
    }
}
