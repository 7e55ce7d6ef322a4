//! Error types for organization tree fetches

use orgtree_directory::{ConfigError, DirectoryError};
use thiserror::Error;

/// Errors from building or tagging the organization tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A remote call failed somewhere in the traversal
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// A spawned task panicked or was cancelled before reporting
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

impl TreeError {
    /// The remote failure behind this error, if any.
    pub fn directory_error(&self) -> Option<&DirectoryError> {
        match self {
            TreeError::Directory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for TreeError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            TreeError::TaskFailed("task cancelled".to_string())
        } else {
            TreeError::TaskFailed(format!("task panicked: {}", err))
        }
    }
}
