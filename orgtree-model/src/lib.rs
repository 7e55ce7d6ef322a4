//! # Organization Tree Model
//!
//! This crate provides the in-memory model of a cloud account organization:
//! the organization itself, its organizational units and the accounts placed
//! under them.
//!
//! ## Overview
//!
//! The orgtree-model crate handles:
//! - **Organizations**: The snapshot root, carrying the management account
//! - **Organizational Units**: Named tree nodes keyed by name
//! - **Accounts**: Member accounts with status and tags
//! - **Flattening**: Flat unit and account listings with ancestor paths
//!
//! ## Architecture
//!
//! ```text
//! Organization
//!   ├─ ManagementAccount
//!   └─ OrganizationalUnit (root)
//!         ├─ Account
//!         └─ OrganizationalUnit
//!               └─ ...
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use orgtree_model::{Account, AccountStatus, Organization, OrganizationalUnit};
//!
//! let infra = OrganizationalUnit::new("ou-1", "Infra").with_account(Account::new(
//!     "111111111111",
//!     "mgmt",
//!     "root@example.com",
//!     AccountStatus::Active,
//! ));
//! let org = Organization::new("o-1").with_root(OrganizationalUnit::new("r-1", "Root").with_unit(infra));
//!
//! let accounts = org.accounts();
//! assert_eq!(accounts["mgmt"].ou_name_path, vec!["Root", "Infra"]);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod account;
pub mod flatten;
pub mod organization;
pub mod unit;

// Re-export main types for convenience
pub use account::{Account, AccountStatus, AccountTags, Tags};
pub use flatten::{AccountInfo, OrgUnitInfo};
pub use organization::Organization;
pub use unit::OrganizationalUnit;
