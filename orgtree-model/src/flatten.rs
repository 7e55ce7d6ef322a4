//! Flat views over an assembled tree
//!
//! Consumers that only need lookups (billing exports, inventory reports) get
//! flat listings here. Everything is derived from the tree itself; no remote
//! calls are involved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::account::Tags;
use crate::organization::Organization;
use crate::unit::OrganizationalUnit;

/// A unit together with the path of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnitInfo {
    /// Unit name
    pub name: String,

    /// Unit identifier
    pub id: String,

    /// Ancestor names, root level first; empty for roots
    pub parent_path: Vec<String>,

    /// Ancestor identifiers, aligned with `parent_path`
    pub parent_id_path: Vec<String>,

    /// Unit tags
    pub tags: Tags,
}

/// An account together with the path of the units containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account identifier
    pub id: String,

    /// Account name
    pub name: String,

    /// Account email
    pub email: String,

    /// Whether the account is active
    pub active: bool,

    /// Names of the units from the root down to the containing unit
    pub ou_name_path: Vec<String>,

    /// Identifiers aligned with `ou_name_path`
    pub ou_id_path: Vec<String>,

    /// Organization identifier
    pub org: String,

    /// Account tags
    pub tags: Tags,
}

impl Organization {
    /// Every unit in the tree, depth first, with its ancestor path.
    ///
    /// # Examples
    ///
    /// ```
    /// use orgtree_model::{Organization, OrganizationalUnit};
    ///
    /// let org = Organization::new("o-1").with_root(
    ///     OrganizationalUnit::new("r-1", "Root").with_unit(OrganizationalUnit::new("ou-1", "Infra")),
    /// );
    ///
    /// let units = org.org_units_info();
    /// assert_eq!(units.len(), 2);
    /// assert_eq!(units[1].parent_path, vec!["Root".to_string()]);
    /// ```
    pub fn org_units_info(&self) -> Vec<OrgUnitInfo> {
        let mut units = Vec::new();
        let mut names = Vec::new();
        let mut ids = Vec::new();
        for root in self.org_units.values() {
            collect_units(root, &mut names, &mut ids, &mut units);
        }
        units
    }

    /// Every account in the tree keyed by account name.
    ///
    /// Accounts sharing a name in different units collide; the one visited
    /// last (depth first, names in order) is kept.
    pub fn accounts(&self) -> BTreeMap<String, AccountInfo> {
        let mut accounts = BTreeMap::new();
        let mut names = Vec::new();
        let mut ids = Vec::new();
        for root in self.org_units.values() {
            collect_accounts(&self.id, root, &mut names, &mut ids, &mut accounts);
        }
        accounts
    }
}

fn collect_units(
    unit: &OrganizationalUnit,
    names: &mut Vec<String>,
    ids: &mut Vec<String>,
    out: &mut Vec<OrgUnitInfo>,
) {
    out.push(OrgUnitInfo {
        name: unit.name.clone(),
        id: unit.id.clone(),
        parent_path: names.clone(),
        parent_id_path: ids.clone(),
        tags: unit.tags.clone(),
    });

    names.push(unit.name.clone());
    ids.push(unit.id.clone());
    for child in unit.org_units.values() {
        collect_units(child, names, ids, out);
    }
    names.pop();
    ids.pop();
}

fn collect_accounts(
    org_id: &str,
    unit: &OrganizationalUnit,
    names: &mut Vec<String>,
    ids: &mut Vec<String>,
    out: &mut BTreeMap<String, AccountInfo>,
) {
    names.push(unit.name.clone());
    ids.push(unit.id.clone());

    for account in unit.accounts.values() {
        out.insert(
            account.name.clone(),
            AccountInfo {
                id: account.id.clone(),
                name: account.name.clone(),
                email: account.email.clone(),
                active: account.is_active(),
                ou_name_path: names.clone(),
                ou_id_path: ids.clone(),
                org: org_id.to_string(),
                tags: account.tags.clone(),
            },
        );
    }

    for child in unit.org_units.values() {
        collect_accounts(org_id, child, names, ids, out);
    }

    names.pop();
    ids.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountStatus};

    fn sample() -> Organization {
        let prod = Account::new("333", "prod", "prod@example.com", AccountStatus::Active)
            .with_tags(Tags::from([("env".to_string(), "prod".to_string())]));

        Organization::new("o-1").with_root(
            OrganizationalUnit::new("r-1", "Root")
                .with_account(Account::new("111", "mgmt", "m@example.com", AccountStatus::Active))
                .with_unit(
                    OrganizationalUnit::new("ou-1", "Workloads")
                        .with_unit(OrganizationalUnit::new("ou-2", "Prod").with_account(prod)),
                )
                .with_unit(OrganizationalUnit::new("ou-3", "Sandbox").with_account(Account::new(
                    "444",
                    "old",
                    "old@example.com",
                    AccountStatus::Suspended,
                ))),
        )
    }

    #[test]
    fn test_org_units_info_paths() {
        let units = sample().org_units_info();
        let by_name: BTreeMap<_, _> = units.iter().map(|u| (u.name.as_str(), u)).collect();

        assert_eq!(units.len(), 4);
        assert!(by_name["Root"].parent_path.is_empty());
        assert_eq!(by_name["Workloads"].parent_path, vec!["Root"]);
        assert_eq!(by_name["Prod"].parent_path, vec!["Root", "Workloads"]);
        assert_eq!(by_name["Prod"].parent_id_path, vec!["r-1", "ou-1"]);
    }

    #[test]
    fn test_accounts_carry_full_path() {
        let accounts = sample().accounts();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts["mgmt"].ou_name_path, vec!["Root"]);
        assert_eq!(accounts["prod"].ou_name_path, vec!["Root", "Workloads", "Prod"]);
        assert_eq!(accounts["prod"].ou_id_path, vec!["r-1", "ou-1", "ou-2"]);
        assert_eq!(accounts["prod"].tags["env"], "prod");
        assert_eq!(accounts["prod"].org, "o-1");
        assert!(!accounts["old"].active);
    }

    #[test]
    fn test_flattening_is_deterministic() {
        let org = sample();

        assert_eq!(org.org_units_info(), org.org_units_info());
        assert_eq!(org.accounts(), org.accounts());
    }

    #[test]
    fn test_accounts_same_name_across_units_last_visited_wins() {
        let org = Organization::new("o-1").with_root(
            OrganizationalUnit::new("r-1", "Root")
                .with_unit(OrganizationalUnit::new("ou-a", "A").with_account(Account::new(
                    "1",
                    "dup",
                    "a@example.com",
                    AccountStatus::Active,
                )))
                .with_unit(OrganizationalUnit::new("ou-b", "B").with_account(Account::new(
                    "2",
                    "dup",
                    "b@example.com",
                    AccountStatus::Active,
                ))),
        );

        let accounts = org.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts["dup"].id, "2");
    }
}
