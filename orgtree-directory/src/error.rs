//! Error types for directory and tagging calls
//!
//! Every failure of a remote call is reported as a [`DirectoryError`] naming
//! the operation that failed. Nothing in this crate retries.

use thiserror::Error;

use crate::types::Operation;

/// Errors from directory and tagging operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The remote call failed (network, service fault, unknown resource)
    #[error("{operation} failed: {message}")]
    Remote {
        /// Failing operation.
        operation: Operation,
        /// Error message from the service.
        message: String,
    },

    /// The service rejected the call because of rate limits
    #[error("{operation} throttled: {message}")]
    Throttled {
        /// Failing operation.
        operation: Operation,
        /// Error message from the service.
        message: String,
    },

    /// The caller is not allowed to perform the call
    #[error("{operation} access denied: {message}")]
    AccessDenied {
        /// Failing operation.
        operation: Operation,
        /// Error message from the service.
        message: String,
    },

    /// The fetch deadline passed before the call completed
    #[error("{operation} exceeded the fetch deadline")]
    DeadlineExceeded {
        /// Operation that was in flight.
        operation: Operation,
    },

    /// A page after the first one failed
    #[error("{operation} failed on page {page}: {source}")]
    Pagination {
        /// Paginated operation.
        operation: Operation,
        /// Zero-based index of the failing page.
        page: usize,
        /// Failure of that page.
        #[source]
        source: Box<DirectoryError>,
    },

    /// The service answered with something unusable
    #[error("{operation} returned an invalid response: {message}")]
    InvalidResponse {
        /// Failing operation.
        operation: Operation,
        /// What was wrong.
        message: String,
    },
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl DirectoryError {
    /// A generic remote failure of `operation`.
    pub fn remote(operation: Operation, message: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            message: message.into(),
        }
    }

    /// An unusable answer from `operation`.
    pub fn invalid_response(operation: Operation, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation,
            message: message.into(),
        }
    }

    /// Operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Remote { operation, .. }
            | Self::Throttled { operation, .. }
            | Self::AccessDenied { operation, .. }
            | Self::DeadlineExceeded { operation }
            | Self::Pagination { operation, .. }
            | Self::InvalidResponse { operation, .. } => *operation,
        }
    }

    /// The underlying failure, looking through pagination wrapping.
    pub fn root_cause(&self) -> &DirectoryError {
        match self {
            Self::Pagination { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the failure was caused by the fetch deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self.root_cause(), Self::DeadlineExceeded { .. })
    }
}
