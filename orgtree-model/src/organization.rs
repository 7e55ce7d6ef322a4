//! Organization domain models
//!
//! This module provides the Organization entity, the root of an assembled
//! tree. An Organization is produced once per fetch and is not modified
//! afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::account::Account;
use crate::unit::OrganizationalUnit;

/// A snapshot of the whole account organization.
///
/// # Architecture
///
/// ```text
/// Organization
///   ├─ ManagementAccount (copy of the account found in the tree)
///   └─ OrgUnits (root name → root OrganizationalUnit)
///         ├─ Accounts
///         └─ OrgUnits
///               └─ ...
/// ```
///
/// # Examples
///
/// ```
/// use orgtree_model::{Account, AccountStatus, Organization, OrganizationalUnit};
///
/// let mgmt = Account::new("111111111111", "mgmt", "root@example.com", AccountStatus::Active);
/// let root = OrganizationalUnit::new("r-ab12", "Root").with_account(mgmt.clone());
///
/// let org = Organization::new("o-1").with_management_account(mgmt).with_root(root);
/// assert_eq!(org.management_account.id, "111111111111");
/// assert_eq!(org.account_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization identifier (`o-…`)
    pub id: String,

    /// The account administering the organization
    ///
    /// Left at its default value when no account in the tree matched the
    /// organization's management account id.
    pub management_account: Account,

    /// Root units by name
    #[serde(default)]
    pub org_units: BTreeMap<String, OrganizationalUnit>,

    /// When the snapshot was taken
    pub fetched_at: DateTime<Utc>,
}

impl Organization {
    /// Creates an empty organization stamped with the current time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            management_account: Account::default(),
            org_units: BTreeMap::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Set the management account.
    pub fn with_management_account(mut self, account: Account) -> Self {
        self.management_account = account;
        self
    }

    /// Add a root unit. A root with the same name is replaced.
    pub fn with_root(mut self, root: OrganizationalUnit) -> Self {
        self.org_units.insert(root.name.clone(), root);
        self
    }

    /// Whether a management account was located in the tree.
    pub fn has_management_account(&self) -> bool {
        !self.management_account.id.is_empty()
    }

    /// Total number of units, roots included.
    pub fn unit_count(&self) -> usize {
        self.org_units
            .values()
            .map(OrganizationalUnit::unit_count)
            .sum()
    }

    /// Total number of accounts in the tree.
    pub fn account_count(&self) -> usize {
        self.org_units
            .values()
            .map(OrganizationalUnit::account_count)
            .sum()
    }

    /// Find an account anywhere in the tree by id.
    pub fn find_account(&self, account_id: &str) -> Option<&Account> {
        self.org_units
            .values()
            .find_map(|root| root.find_account(account_id))
    }
}
