//! # Organization Tree Discovery
//!
//! This crate discovers the full structure of a cloud account organization
//! and returns it as one in-memory [`Organization`] tree, with every account
//! tagged.
//!
//! ## Overview
//!
//! The orgtree crate handles:
//! - **Tree Builder**: Concurrent walk of roots, units and accounts
//! - **Tag Merger**: Bulk account tag lookup spliced onto the tree
//! - **Provider**: The top-level fetch running both halves together
//!
//! ## Features
//!
//! - `memory` (default): In-memory directory for tests and local tooling
//! - `aws`: AWS Organizations and Resource Groups Tagging backends
//!
//! ## Architecture
//!
//! ```text
//! OrgTreeProvider::org_tree
//!   ├─ TreeBuilder::build_tree ──── DirectoryClient
//!   └─ fetch_account_tags ───────── TagClient
//!         └─ apply_tags(tree, tags)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orgtree::{OrgTreeProvider, OrgTreeSource};
//! use orgtree_directory::{AccountSummary, DirectoryConfig, MemoryDirectory};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let directory = Arc::new(
//!         MemoryDirectory::new()
//!             .with_organization("o-1", "111111111111")
//!             .with_root("r-1", "Root")
//!             .with_unit("r-1", "ou-1", "Infra")
//!             .with_account("ou-1", AccountSummary {
//!                 id: "111111111111".to_string(),
//!                 name: "mgmt".to_string(),
//!                 email: "root@example.com".to_string(),
//!                 status: "ACTIVE".to_string(),
//!             })
//!             .with_account_tags("111111111111", [("env", "prod")]),
//!     );
//!
//!     let provider =
//!         OrgTreeProvider::new(directory.clone(), directory, DirectoryConfig::from_env()).unwrap();
//!     let tree = provider.org_tree().await.unwrap();
//!
//!     for (name, account) in tree.accounts() {
//!         println!("{} {:?}", name, account.ou_name_path);
//!     }
//! }
//! ```

pub mod builder;
pub mod error;
pub mod provider;
pub mod tags;

// Re-export main types
pub use builder::TreeBuilder;
pub use error::{TreeError, TreeResult};
pub use provider::{OrgTreeProvider, OrgTreeSource};
pub use tags::{apply_tags, fetch_account_tags};

pub use orgtree_model::{
    Account, AccountInfo, AccountStatus, AccountTags, OrgUnitInfo, Organization,
    OrganizationalUnit, Tags,
};
