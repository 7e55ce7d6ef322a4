//! Account domain models
//!
//! This module provides the Account entity: a single member account of the
//! organization, as listed under exactly one organizational unit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag key to tag value.
pub type Tags = BTreeMap<String, String>;

/// Account identifier to that account's tags.
pub type AccountTags = BTreeMap<String, Tags>;

/// Lifecycle status of an account as reported by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account is active
    Active,
    /// Account is suspended
    Suspended,
    /// Account is scheduled for closure
    PendingClosure,
    /// Status not recognised
    Unknown,
}

impl AccountStatus {
    /// Parse a directory status string (`ACTIVE`, `SUSPENDED`, `PENDING_CLOSURE`).
    ///
    /// Anything else maps to [`AccountStatus::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use orgtree_model::AccountStatus;
    ///
    /// assert_eq!(AccountStatus::parse("ACTIVE"), AccountStatus::Active);
    /// assert_eq!(AccountStatus::parse("closed?"), AccountStatus::Unknown);
    /// ```
    pub fn parse(value: &str) -> Self {
        match value {
            "ACTIVE" => Self::Active,
            "SUSPENDED" => Self::Suspended,
            "PENDING_CLOSURE" => Self::PendingClosure,
            _ => Self::Unknown,
        }
    }

    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::PendingClosure => "PENDING_CLOSURE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member account of the organization.
///
/// Tags are empty when the account is first discovered; they are filled in
/// one piece once the bulk tag lookup has completed.
///
/// # Examples
///
/// ```
/// use orgtree_model::{Account, AccountStatus};
///
/// let account = Account::new("111111111111", "mgmt", "root@example.com", AccountStatus::Active);
/// assert!(account.is_active());
/// assert!(account.tags.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier (12-digit account number)
    pub id: String,

    /// Account name
    pub name: String,

    /// Root email address of the account
    pub email: String,

    /// Directory status
    pub status: AccountStatus,

    /// Account tags
    #[serde(default)]
    pub tags: Tags,
}

impl Account {
    /// Creates an untagged account.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        status: AccountStatus,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            status,
            tags: Tags::new(),
        }
    }

    /// Whether the account is in the `ACTIVE` state.
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Returns the account with its tag map replaced.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}
