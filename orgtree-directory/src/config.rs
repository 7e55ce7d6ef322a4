//! Directory client configuration.
//!
//! Provides the settings shared by the directory and tagging clients and by
//! the fetch itself. Configuration is loaded from environment variables with
//! defaults matching the public AWS endpoints.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Resource type filter selecting organization member accounts.
pub const ACCOUNT_RESOURCE_TYPE: &str = "organizations:account";

/// Region serving tag lookups for organization accounts.
pub const DEFAULT_TAG_REGION: &str = "us-east-1";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings for one organization fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Deadline for the whole fetch in seconds; `0` disables it.
    pub fetch_timeout_secs: u64,

    /// Region the tagging client talks to.
    pub tag_region: String,

    /// Resource type filter used for the bulk tag lookup.
    pub account_resource_type: String,

    /// Endpoint override (e.g. a local emulator).
    pub endpoint_url: Option<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 300,
            tag_region: DEFAULT_TAG_REGION.to_string(),
            account_resource_type: ACCOUNT_RESOURCE_TYPE.to_string(),
            endpoint_url: None,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ORGTREE_FETCH_TIMEOUT_SECS`: Fetch deadline in seconds (default: 300, `0` = none)
    /// - `ORGTREE_TAG_REGION`: Tagging API region (default: us-east-1)
    /// - `ORGTREE_ACCOUNT_RESOURCE_TYPE`: Tag lookup resource type (default: organizations:account)
    /// - `ORGTREE_ENDPOINT_URL`: Endpoint override for both clients
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            fetch_timeout_secs: std::env::var("ORGTREE_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.fetch_timeout_secs),
            tag_region: std::env::var("ORGTREE_TAG_REGION").unwrap_or(default.tag_region),
            account_resource_type: std::env::var("ORGTREE_ACCOUNT_RESOURCE_TYPE")
                .unwrap_or(default.account_resource_type),
            endpoint_url: std::env::var("ORGTREE_ENDPOINT_URL")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    /// The fetch deadline as a Duration, if enabled.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_region.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ORGTREE_TAG_REGION".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.account_resource_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ORGTREE_ACCOUNT_RESOURCE_TYPE".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
