use crate::domain::value_objects::ObjectKey;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend reported that no object exists under the key
    #[error("Object not found: {key}")]
    ObjectNotFound { key: ObjectKey },

    /// Any other backend failure: network, credentials, throttling, ...
    #[error("Storage backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The uploaded body did not match its declared content length
    #[error("Body length mismatch for {key}: declared {declared} bytes, received {received}")]
    BodyLengthMismatch {
        key: ObjectKey,
        declared: u64,
        received: u64,
    },

    /// Reading the inbound request body failed
    #[error("Failed to read request body: {0}")]
    Body(#[source] std::io::Error),
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend {
            message: message.into(),
            source: None,
        }
    }

    pub fn backend_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StorageError::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is the backend's "no such key" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
