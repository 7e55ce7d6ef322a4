//! AWS-backed directory and tagging clients.
//!
//! [`AwsDirectory`] wraps the AWS Organizations API and [`AwsTagging`] the
//! Resource Groups Tagging API. Both are built from an already loaded
//! `SdkConfig`; credential resolution is the caller's business.

use async_trait::async_trait;
use aws_sdk_organizations::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_organizations::types::ChildType as AwsChildType;

use crate::client::{DirectoryClient, TagClient};
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::types::{
    AccountSummary, ChildSummary, ChildType, Operation, OrganizationSummary, Page,
    ResourceTagMapping, RootSummary, Tag, UnitSummary,
};

/// Map an SDK error onto [`DirectoryError`].
fn classify<E>(operation: Operation, err: E) -> DirectoryError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let code = err.code().map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();

    match code.as_deref() {
        Some("TooManyRequestsException" | "ThrottlingException" | "Throttling") => {
            DirectoryError::Throttled { operation, message }
        }
        Some(
            "AccessDeniedException"
            | "AccessDenied"
            | "AWSOrganizationsNotInUseException"
            | "UnrecognizedClientException",
        ) => DirectoryError::AccessDenied { operation, message },
        _ => DirectoryError::Remote { operation, message },
    }
}

fn required(operation: Operation, field: &str, value: Option<&str>) -> DirectoryResult<String> {
    value
        .map(str::to_string)
        .ok_or_else(|| DirectoryError::invalid_response(operation, format!("missing {}", field)))
}

/// AWS Organizations directory client.
#[derive(Debug, Clone)]
pub struct AwsDirectory {
    client: aws_sdk_organizations::Client,
}

impl AwsDirectory {
    /// Create a client from SDK configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    /// let directory = AwsDirectory::new(&sdk_config, &DirectoryConfig::from_env());
    /// ```
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &DirectoryConfig) -> Self {
        let mut builder = aws_sdk_organizations::config::Builder::from(sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: aws_sdk_organizations::Client::from_conf(builder.build()),
        }
    }

    /// Wrap a pre-built client.
    pub fn from_client(client: aws_sdk_organizations::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DirectoryClient for AwsDirectory {
    async fn list_roots(&self, page_token: Option<String>) -> DirectoryResult<Page<RootSummary>> {
        let op = Operation::ListRoots;
        let out = self
            .client
            .list_roots()
            .set_next_token(page_token)
            .send()
            .await
            .map_err(|e| classify(op, e))?;

        let items = out
            .roots()
            .iter()
            .map(|root| {
                Ok(RootSummary {
                    id: required(op, "root id", root.id())?,
                    name: required(op, "root name", root.name())?,
                })
            })
            .collect::<DirectoryResult<Vec<_>>>()?;

        Ok(Page::new(items, out.next_token().map(str::to_string)))
    }

    async fn list_children(
        &self,
        parent_id: &str,
        child_type: ChildType,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<ChildSummary>> {
        let op = Operation::ListChildren;
        let child_type = match child_type {
            ChildType::OrganizationalUnit => AwsChildType::OrganizationalUnit,
            ChildType::Account => AwsChildType::Account,
        };

        let out = self
            .client
            .list_children()
            .parent_id(parent_id)
            .child_type(child_type)
            .set_next_token(page_token)
            .send()
            .await
            .map_err(|e| classify(op, e))?;

        let items = out
            .children()
            .iter()
            .map(|child| {
                Ok(ChildSummary {
                    id: required(op, "child id", child.id())?,
                })
            })
            .collect::<DirectoryResult<Vec<_>>>()?;

        Ok(Page::new(items, out.next_token().map(str::to_string)))
    }

    async fn describe_organizational_unit(&self, unit_id: &str) -> DirectoryResult<UnitSummary> {
        let op = Operation::DescribeOrganizationalUnit;
        let out = self
            .client
            .describe_organizational_unit()
            .organizational_unit_id(unit_id)
            .send()
            .await
            .map_err(|e| classify(op, e))?;

        let unit = out
            .organizational_unit()
            .ok_or_else(|| DirectoryError::invalid_response(op, "missing organizational unit"))?;

        Ok(UnitSummary {
            id: required(op, "unit id", unit.id())?,
            name: required(op, "unit name", unit.name())?,
        })
    }

    async fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<AccountSummary>> {
        let op = Operation::ListAccountsForParent;
        let out = self
            .client
            .list_accounts_for_parent()
            .parent_id(parent_id)
            .set_next_token(page_token)
            .send()
            .await
            .map_err(|e| classify(op, e))?;

        let items = out
            .accounts()
            .iter()
            .map(|account| {
                Ok(AccountSummary {
                    id: required(op, "account id", account.id())?,
                    name: account.name().unwrap_or_default().to_string(),
                    email: account.email().unwrap_or_default().to_string(),
                    status: account
                        .status()
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_default(),
                })
            })
            .collect::<DirectoryResult<Vec<_>>>()?;

        Ok(Page::new(items, out.next_token().map(str::to_string)))
    }

    async fn describe_organization(&self) -> DirectoryResult<OrganizationSummary> {
        let op = Operation::DescribeOrganization;
        let out = self
            .client
            .describe_organization()
            .send()
            .await
            .map_err(|e| classify(op, e))?;

        let org = out
            .organization()
            .ok_or_else(|| DirectoryError::invalid_response(op, "missing organization"))?;

        Ok(OrganizationSummary {
            id: required(op, "organization id", org.id())?,
            management_account_id: required(op, "management account id", org.master_account_id())?,
        })
    }
}

/// AWS Resource Groups Tagging client.
#[derive(Debug, Clone)]
pub struct AwsTagging {
    client: aws_sdk_resourcegroupstagging::Client,
}

impl AwsTagging {
    /// Create a client from SDK configuration, pinned to the configured tag region.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &DirectoryConfig) -> Self {
        let mut builder = aws_sdk_resourcegroupstagging::config::Builder::from(sdk_config)
            .region(aws_sdk_resourcegroupstagging::config::Region::new(
                config.tag_region.clone(),
            ));
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: aws_sdk_resourcegroupstagging::Client::from_conf(builder.build()),
        }
    }

    /// Wrap a pre-built client.
    pub fn from_client(client: aws_sdk_resourcegroupstagging::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TagClient for AwsTagging {
    async fn get_resources(
        &self,
        resource_type_filter: &str,
        page_token: Option<String>,
    ) -> DirectoryResult<Page<ResourceTagMapping>> {
        let op = Operation::GetResources;
        let out = self
            .client
            .get_resources()
            .resource_type_filters(resource_type_filter)
            .include_compliance_details(false)
            .set_pagination_token(page_token)
            .send()
            .await
            .map_err(|e| classify(op, e))?;

        let items = out
            .resource_tag_mapping_list()
            .iter()
            .map(|mapping| {
                Ok(ResourceTagMapping {
                    resource_arn: required(op, "resource arn", mapping.resource_arn())?,
                    tags: mapping
                        .tags()
                        .iter()
                        .map(|tag| Tag::new(tag.key(), tag.value()))
                        .collect(),
                })
            })
            .collect::<DirectoryResult<Vec<_>>>()?;

        Ok(Page::new(items, out.pagination_token().map(str::to_string)))
    }
}
