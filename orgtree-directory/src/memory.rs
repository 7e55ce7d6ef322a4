//! In-memory directory and tagging service.
//!
//! [`MemoryDirectory`] serves a fixed organization from memory, paginating
//! its listings the way the remote services do. It is meant for tests and
//! local tooling: faults can be injected per operation (and per page), every
//! call can be delayed, and call counts are recorded.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::client::{DirectoryClient, TagClient};
use crate::config::ACCOUNT_RESOURCE_TYPE;
use crate::error::{DirectoryError, DirectoryResult};
use crate::types::{
    AccountSummary, ChildSummary, ChildType, Operation, OrganizationSummary, Page,
    ResourceTagMapping, RootSummary, Tag, UnitSummary,
};

/// An injected failure.
#[derive(Debug, Clone)]
struct Fault {
    /// Page index the fault applies to; `None` fails every page.
    page: Option<usize>,
    error: DirectoryError,
}

/// A resource registered with the tagging side.
#[derive(Debug, Clone)]
struct TaggedResource {
    resource_type: String,
    mapping: ResourceTagMapping,
}

/// In-memory organization serving both [`DirectoryClient`] and [`TagClient`].
///
/// # Example
///
/// ```rust
/// use orgtree_directory::{AccountSummary, MemoryDirectory};
///
/// let directory = MemoryDirectory::new()
///     .with_organization("o-1", "111111111111")
///     .with_root("r-1", "Root")
///     .with_unit("r-1", "ou-1", "Infra")
///     .with_account("ou-1", AccountSummary {
///         id: "111111111111".to_string(),
///         name: "mgmt".to_string(),
///         email: "root@example.com".to_string(),
///         status: "ACTIVE".to_string(),
///     })
///     .with_account_tags("111111111111", [("env", "prod")]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    organization: Option<OrganizationSummary>,
    roots: Vec<RootSummary>,
    units: HashMap<String, UnitSummary>,
    children: HashMap<String, Vec<String>>,
    accounts: HashMap<String, Vec<AccountSummary>>,
    resources: Vec<TaggedResource>,
    faults: HashMap<(Operation, String), Fault>,
    page_size: usize,
    latency: Option<Duration>,
    key_latency: HashMap<String, Duration>,
    /// Call counters, shared between clones
    calls: Arc<Mutex<HashMap<Operation, usize>>>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDirectory {
    /// Create an empty directory with a page size of 2.
    pub fn new() -> Self {
        Self {
            organization: None,
            roots: Vec::new(),
            units: HashMap::new(),
            children: HashMap::new(),
            accounts: HashMap::new(),
            resources: Vec::new(),
            faults: HashMap::new(),
            page_size: 2,
            latency: None,
            key_latency: HashMap::new(),
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Set the organization descriptor.
    pub fn with_organization(
        mut self,
        id: impl Into<String>,
        management_account_id: impl Into<String>,
    ) -> Self {
        self.organization = Some(OrganizationSummary {
            id: id.into(),
            management_account_id: management_account_id.into(),
        });
        self
    }

    /// Add a root.
    pub fn with_root(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.roots.push(RootSummary {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Add an organizational unit under a root or unit.
    pub fn with_unit(
        mut self,
        parent_id: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let id = id.into();
        self.children
            .entry(parent_id.into())
            .or_default()
            .push(id.clone());
        self.units.insert(
            id.clone(),
            UnitSummary {
                id,
                name: name.into(),
            },
        );
        self
    }

    /// Add an account under a root or unit.
    pub fn with_account(mut self, parent_id: impl Into<String>, account: AccountSummary) -> Self {
        self.accounts
            .entry(parent_id.into())
            .or_default()
            .push(account);
        self
    }

    /// Register tags for an account under the account resource type.
    pub fn with_account_tags<I, K, V>(self, account_id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let management = self
            .organization
            .as_ref()
            .map(|o| o.management_account_id.clone())
            .unwrap_or_default();
        let org_id = self
            .organization
            .as_ref()
            .map(|o| o.id.clone())
            .unwrap_or_default();
        let arn = format!(
            "arn:aws:organizations::{}:account/{}/{}",
            management, org_id, account_id
        );
        self.with_resource(
            ACCOUNT_RESOURCE_TYPE,
            ResourceTagMapping {
                resource_arn: arn,
                tags: tags.into_iter().map(|(k, v)| Tag::new(k, v)).collect(),
            },
        )
    }

    /// Register a tagged resource of any type.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        mapping: ResourceTagMapping,
    ) -> Self {
        self.resources.push(TaggedResource {
            resource_type: resource_type.into(),
            mapping,
        });
        self
    }

    /// Items per page for every listing.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Delay applied to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay applied to calls for `key`, overriding [`with_latency`](Self::with_latency).
    ///
    /// Keys are the same as for [`fail_on`](Self::fail_on).
    pub fn with_latency_on(mut self, key: impl Into<String>, latency: Duration) -> Self {
        self.key_latency.insert(key.into(), latency);
        self
    }

    /// Fail every call of `operation` for `key` with a remote error.
    ///
    /// `key` is the parent id for listings, the unit id for
    /// `DescribeOrganizationalUnit`, and `""` for `ListRoots`,
    /// `DescribeOrganization` and `GetResources`.
    pub fn fail_on(self, operation: Operation, key: impl Into<String>) -> Self {
        let error = DirectoryError::remote(operation, "injected failure");
        self.fail_with(operation, key, None, error)
    }

    /// Fail one page (or every page when `page` is `None`) with `error`.
    pub fn fail_with(
        mut self,
        operation: Operation,
        key: impl Into<String>,
        page: Option<usize>,
        error: DirectoryError,
    ) -> Self {
        self.faults
            .insert((operation, key.into()), Fault { page, error });
        self
    }

    /// Number of calls made so far for `operation`.
    pub fn call_count(&self, operation: Operation) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.get(&operation).copied().unwrap_or(0)
    }

    /// Total number of calls made so far.
    pub fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.values().sum()
    }

    /// Record the call, wait out the latency and check for a fault.
    async fn enter(&self, operation: Operation, key: &str, page: usize) -> DirectoryResult<()> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            *calls.entry(operation).or_insert(0) += 1;
        }

        if let Some(latency) = self.key_latency.get(key).copied().or(self.latency) {
            tokio::time::sleep(latency).await;
        }

        match self.faults.get(&(operation, key.to_string())) {
            Some(fault) if fault.page.map_or(true, |p| p == page) => {
                tracing::debug!(operation = %operation, key, page, "Injected fault");
                Err(fault.error.clone())
            }
            _ => Ok(()),
        }
    }

    fn page_index(&self, operation: Operation, token: Option<&str>) -> DirectoryResult<usize> {
        match token {
            None => Ok(0),
            Some(token) => token.parse::<usize>().map_err(|_| {
                DirectoryError::remote(operation, format!("invalid pagination token: {}", token))
            }),
        }
    }

    fn slice<T: Clone>(&self, items: &[T], page: usize) -> Page<T> {
        let start = (page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        let next_token = (end < items.len()).then(|| (page + 1).to_string());
        Page::new(items[start..end].to_vec(), next_token)
    }
}

#[async_trait]
impl DirectoryClient for MemoryDirectory {
    async fn list_roots(&self, page_token: Option<String>) -> DirectoryResult<Page<RootSummary>> {
        let page = self.page_index(Operation::ListRoots, page_token.as_deref())?;
        self.enter(Operation::ListRoots, "", page).await?;
        Ok(self.slice(&self.roots, page))
    }

    async fn list_children(
        &self,
        parent_id: &str,
        child_type: ChildType,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<ChildSummary>> {
        let page = self.page_index(Operation::ListChildren, page_token.as_deref())?;
        self.enter(Operation::ListChildren, parent_id, page).await?;

        let children: Vec<ChildSummary> = match child_type {
            ChildType::OrganizationalUnit => self
                .children
                .get(parent_id)
                .map(|ids| ids.iter().map(|id| ChildSummary { id: id.clone() }).collect())
                .unwrap_or_default(),
            ChildType::Account => self
                .accounts
                .get(parent_id)
                .map(|accounts| {
                    accounts
                        .iter()
                        .map(|a| ChildSummary { id: a.id.clone() })
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(self.slice(&children, page))
    }

    async fn describe_organizational_unit(&self, unit_id: &str) -> DirectoryResult<UnitSummary> {
        self.enter(Operation::DescribeOrganizationalUnit, unit_id, 0)
            .await?;

        self.units.get(unit_id).cloned().ok_or_else(|| {
            DirectoryError::remote(
                Operation::DescribeOrganizationalUnit,
                format!("organizational unit not found: {}", unit_id),
            )
        })
    }

    async fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<AccountSummary>> {
        let page = self.page_index(Operation::ListAccountsForParent, page_token.as_deref())?;
        self.enter(Operation::ListAccountsForParent, parent_id, page)
            .await?;

        let accounts = self
            .accounts
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(self.slice(accounts, page))
    }

    async fn describe_organization(&self) -> DirectoryResult<OrganizationSummary> {
        self.enter(Operation::DescribeOrganization, "", 0).await?;

        self.organization.clone().ok_or_else(|| DirectoryError::AccessDenied {
            operation: Operation::DescribeOrganization,
            message: "account is not a member of an organization".to_string(),
        })
    }
}

#[async_trait]
impl TagClient for MemoryDirectory {
    async fn get_resources(
        &self,
        resource_type_filter: &str,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<ResourceTagMapping>> {
        let page = self.page_index(Operation::GetResources, page_token.as_deref())?;
        self.enter(Operation::GetResources, "", page).await?;

        let matching: Vec<ResourceTagMapping> = self
            .resources
            .iter()
            .filter(|r| r.resource_type == resource_type_filter)
            .map(|r| r.mapping.clone())
            .collect();

        Ok(self.slice(&matching, page))
    }
}
