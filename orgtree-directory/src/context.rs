//! Per-fetch call context.
//!
//! A [`CallContext`] is created once per top-level fetch and handed to every
//! remote call issued on its behalf, so a single deadline bounds the whole
//! traversal no matter how many tasks it fans out into.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::types::Operation;

/// Deadline shared by all remote calls of one fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context expiring at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// A context using the configured fetch timeout, if any.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        config
            .fetch_timeout()
            .map(Self::with_timeout)
            .unwrap_or_default()
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run one remote call under this context.
    ///
    /// Expiry of the deadline is reported as
    /// [`DirectoryError::DeadlineExceeded`] for `operation`.
    pub async fn call<T, F>(&self, operation: Operation, call: F) -> DirectoryResult<T>
    where
        F: Future<Output = DirectoryResult<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, call)
                .await
                .map_err(|_| {
                    tracing::debug!(operation = %operation, "Remote call hit the fetch deadline");
                    DirectoryError::DeadlineExceeded { operation }
                })?,
            None => call.await,
        }
    }
}
