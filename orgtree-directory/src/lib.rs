//! # Organization Directory
//!
//! This crate provides the seam between organization tree discovery and the
//! remote services it reads from: the organization directory (roots, units,
//! accounts) and the bulk tagging service.
//!
//! ## Overview
//!
//! The orgtree-directory crate handles:
//! - **Clients**: `DirectoryClient` and `TagClient` traits, one page per call
//! - **Pagination**: `collect_pages` drains a listing until no token remains
//! - **Deadlines**: `CallContext` bounds every call of one fetch
//! - **Configuration**: `DirectoryConfig` loaded from the environment
//! - **Errors**: `DirectoryError`, naming the failing operation
//!
//! ## Features
//!
//! - `memory` (default): In-memory directory for tests and local tooling
//! - `aws`: AWS Organizations and Resource Groups Tagging clients
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orgtree_directory::{
//!     collect_pages, CallContext, ChildType, DirectoryClient, MemoryDirectory, Operation,
//! };
//!
//! async fn list_units(directory: &MemoryDirectory) {
//!     let ctx = CallContext::new();
//!     let children = collect_pages(&ctx, Operation::ListChildren, |token| {
//!         directory.list_children("r-1", ChildType::OrganizationalUnit, token)
//!     })
//!     .await
//!     .unwrap();
//!     println!("{} units under the root", children.len());
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod paginate;
pub mod types;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "aws")]
pub mod aws;

// Re-export main types
pub use client::{DirectoryClient, TagClient};
pub use config::{ConfigError, DirectoryConfig, ACCOUNT_RESOURCE_TYPE, DEFAULT_TAG_REGION};
pub use context::CallContext;
pub use error::{DirectoryError, DirectoryResult};
pub use paginate::collect_pages;
pub use types::{
    AccountSummary, ChildSummary, ChildType, Operation, OrganizationSummary, Page,
    ResourceTagMapping, RootSummary, Tag, UnitSummary,
};

#[cfg(feature = "memory")]
pub use memory::MemoryDirectory;

#[cfg(feature = "aws")]
pub use aws::{AwsDirectory, AwsTagging};
#[cfg(feature = "aws")]
pub use aws_config::SdkConfig;
