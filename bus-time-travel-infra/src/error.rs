//! Error types for declaring and synthesizing infrastructure.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::stack::output::OutputError;

/// Errors that can occur while registering resources or synthesizing a stack.
#[derive(Debug, Error)]
pub enum InfraError {
    /// A logical name was registered twice for the same resource type.
    #[error("duplicate resource: {kind} '{name}' is already registered")]
    DuplicateResource { kind: String, name: String },

    /// A deferred value could not be produced.
    #[error("output resolution failed: {0}")]
    Output(#[from] OutputError),

    /// Rendering JSON failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading the local filesystem failed.
    #[error("failed to {operation} '{}': {source}", .path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resource depends on something registered after it.
    #[error("resource '{resource}' depends on '{dependency}' which is not registered before it")]
    DependencyOrder {
        resource: String,
        dependency: String,
    },
}

impl InfraError {
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateResource {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn file_system(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type InfraResult<T> = Result<T, InfraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_kind_and_name() {
        let err = InfraError::duplicate("aws:iam/role:Role", "reader-role");
        assert_eq!(
            err.to_string(),
            "duplicate resource: aws:iam/role:Role 'reader-role' is already registered"
        );
    }

    #[test]
    fn test_file_system_message_includes_path() {
        let err = InfraError::file_system(
            "read",
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("read"));
        assert!(message.contains("/tmp/missing"));
    }
}
