//! Storage error taxonomy shared by every provider

use thiserror::Error;

use super::provider::ProviderKind;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Storage credential error: {0}")]
    Credential(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{provider} storage error: {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
    },

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Map a filesystem error, keeping missing files distinguishable
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound {
                path: path.to_string(),
            }
        } else {
            StorageError::Io {
                path: path.to_string(),
                source,
            }
        }
    }

    pub fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        StorageError::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// Emit the structured failure record every adapter writes before returning an error
    pub fn logged(self, provider: ProviderKind, operation: &str, path: &str) -> Self {
        tracing::error!(
            provider = %provider,
            operation,
            path,
            error = %self,
            "Storage operation failed"
        );
        self
    }
}

impl StorageError {
    pub fn from_object_store(provider: ProviderKind, err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound { path },
            object_store::Error::InvalidPath { source } => {
                StorageError::InvalidPath(source.to_string())
            }
            object_store::Error::Unauthenticated { path, source }
            | object_store::Error::PermissionDenied { path, source } => {
                StorageError::Credential(format!("access to '{}' denied: {}", path, source))
            }
            other => StorageError::provider(provider, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_missing_file_to_not_found() {
        let err = StorageError::from_io(
            "org1/a.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());

        let err = StorageError::from_io(
            "org1/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn test_object_store_not_found_is_mapped() {
        let err = StorageError::from_object_store(
            ProviderKind::Gcs,
            object_store::Error::NotFound {
                path: "org1/a.txt".to_string(),
                source: "missing".into(),
            },
        );
        match err {
            StorageError::NotFound { path } => assert_eq!(path, "org1/a.txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_object_store_permission_denied_is_credential_error() {
        let err = StorageError::from_object_store(
            ProviderKind::Azure,
            object_store::Error::PermissionDenied {
                path: "org1/a.txt".to_string(),
                source: "403".into(),
            },
        );
        assert!(matches!(err, StorageError::Credential(_)));
    }
}
