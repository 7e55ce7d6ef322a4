//! Organizational unit domain models
//!
//! An organizational unit (OU) groups accounts and further OUs. Units form a
//! strict tree: a parent owns its children and no child refers back to its
//! parent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::account::{Account, Tags};

/// A node of the organization tree.
///
/// Child units and accounts are keyed by name. Two siblings with the same
/// name collide and the one inserted last is kept.
///
/// # Architecture
///
/// ```text
/// OrganizationalUnit
///   ├─ accounts   (name → Account, direct members only)
///   └─ org_units  (name → OrganizationalUnit)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationalUnit {
    /// Unit name
    pub name: String,

    /// Unit identifier (`r-…` for roots, `ou-…` otherwise)
    pub id: String,

    /// Unit tags
    #[serde(default)]
    pub tags: Tags,

    /// Child units by name
    #[serde(default)]
    pub org_units: BTreeMap<String, OrganizationalUnit>,

    /// Accounts placed directly under this unit, by name
    #[serde(default)]
    pub accounts: BTreeMap<String, Account>,
}

impl OrganizationalUnit {
    /// Creates an empty unit.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            tags: Tags::new(),
            org_units: BTreeMap::new(),
            accounts: BTreeMap::new(),
        }
    }

    /// Adds a child unit, returning the unit it displaced if the name was taken.
    pub fn insert_unit(&mut self, unit: OrganizationalUnit) -> Option<OrganizationalUnit> {
        self.org_units.insert(unit.name.clone(), unit)
    }

    /// Adds an account, returning the account it displaced if the name was taken.
    pub fn insert_account(&mut self, account: Account) -> Option<Account> {
        self.accounts.insert(account.name.clone(), account)
    }

    /// Builder-style [`insert_unit`](Self::insert_unit).
    pub fn with_unit(mut self, unit: OrganizationalUnit) -> Self {
        self.insert_unit(unit);
        self
    }

    /// Builder-style [`insert_account`](Self::insert_account).
    pub fn with_account(mut self, account: Account) -> Self {
        self.insert_account(account);
        self
    }

    /// Number of units in this subtree, this one included.
    pub fn unit_count(&self) -> usize {
        1 + self.org_units.values().map(Self::unit_count).sum::<usize>()
    }

    /// Number of accounts in this subtree.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
            + self
                .org_units
                .values()
                .map(Self::account_count)
                .sum::<usize>()
    }

    /// Depth-first search of this subtree for an account id.
    pub fn find_account(&self, account_id: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.id == account_id)
            .or_else(|| {
                self.org_units
                    .values()
                    .find_map(|unit| unit.find_account(account_id))
            })
    }
}
