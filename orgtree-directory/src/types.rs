//! Directory and tagging wire types
//!
//! These are the shapes the tree builder needs from the remote services,
//! independent of any concrete SDK.

use serde::{Deserialize, Serialize};

/// Remote operations issued during a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    ListRoots,
    ListChildren,
    DescribeOrganizationalUnit,
    ListAccountsForParent,
    DescribeOrganization,
    GetResources,
}

impl Operation {
    /// Service-style operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListRoots => "ListRoots",
            Self::ListChildren => "ListChildren",
            Self::DescribeOrganizationalUnit => "DescribeOrganizationalUnit",
            Self::ListAccountsForParent => "ListAccountsForParent",
            Self::DescribeOrganization => "DescribeOrganization",
            Self::GetResources => "GetResources",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,

    /// Token for the next page; `None` (or empty) on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with a continuation token.
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// Continuation token, ignoring empty tokens some services send on the last page.
    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Kind of child to list under a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChildType {
    OrganizationalUnit,
    Account,
}

/// A root of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSummary {
    pub id: String,
    pub name: String,
}

/// A child entry of a parent; only the identifier is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub id: String,
}

/// A described organizational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
}

/// An account as listed under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Raw status string (`ACTIVE`, `SUSPENDED`, `PENDING_CLOSURE`).
    pub status: String,
}

/// The organization descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: String,
    pub management_account_id: String,
}

/// A tag key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags attached to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTagMapping {
    pub resource_arn: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ResourceTagMapping {
    /// Trailing `/` segment of the ARN; for accounts this is the account id.
    ///
    /// ```
    /// use orgtree_directory::ResourceTagMapping;
    ///
    /// let mapping = ResourceTagMapping {
    ///     resource_arn: "arn:aws:organizations::111111111111:account/o-abc/222222222222".to_string(),
    ///     tags: vec![],
    /// };
    /// assert_eq!(mapping.resource_id(), "222222222222");
    /// ```
    pub fn resource_id(&self) -> &str {
        self.resource_arn
            .rsplit('/')
            .next()
            .unwrap_or(&self.resource_arn)
    }
}
