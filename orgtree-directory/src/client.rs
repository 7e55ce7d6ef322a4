//! Client traits for the remote directory and tagging services.
//!
//! Each method issues exactly one remote call and returns at most one page.
//! Draining a listing is left to [`collect_pages`](crate::paginate::collect_pages),
//! and deadlines are applied by [`CallContext`](crate::context::CallContext),
//! so implementations stay thin wrappers around their transport.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::types::{
    AccountSummary, ChildSummary, ChildType, OrganizationSummary, Page, ResourceTagMapping,
    RootSummary, UnitSummary,
};

/// Read-only access to the organization hierarchy.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// List the roots of the organization.
    async fn list_roots(&self, page_token: Option<String>) -> DirectoryResult<Page<RootSummary>>;

    /// List the direct children of a root or unit.
    async fn list_children(
        &self,
        parent_id: &str,
        child_type: ChildType,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<ChildSummary>>;

    /// Describe a single organizational unit.
    async fn describe_organizational_unit(&self, unit_id: &str) -> DirectoryResult<UnitSummary>;

    /// List the accounts placed directly under a root or unit.
    async fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<AccountSummary>>;

    /// Describe the organization itself.
    async fn describe_organization(&self) -> DirectoryResult<OrganizationSummary>;
}

/// Bulk tag lookup by resource type.
#[async_trait]
pub trait TagClient: Send + Sync {
    /// Fetch one page of resources of the given type along with their tags.
    async fn get_resources(
        &self,
        resource_type_filter: &str,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<ResourceTagMapping>>;
}
