//! Top-level organization fetch.
//!
//! [`OrgTreeProvider`] runs the bulk tag lookup in its own task while the
//! tree is being built, then tags the tree once both are done. Whichever half
//! fails first fails the fetch; no untagged or partial tree is handed out.

use async_trait::async_trait;
use orgtree_directory::{CallContext, DirectoryClient, DirectoryConfig, TagClient};
use orgtree_model::Organization;
use std::sync::Arc;
use tracing::{error, info, instrument, Instrument};

use crate::builder::TreeBuilder;
use crate::error::{TreeError, TreeResult};
use crate::tags::{apply_tags, fetch_account_tags};

/// Source of complete, tagged organization trees.
#[async_trait]
pub trait OrgTreeSource: Send + Sync {
    /// Fetch the current organization tree.
    async fn org_tree(&self) -> TreeResult<Organization>;
}

/// Fetches organization trees from a directory and a tagging service.
///
/// # Example
///
/// ```rust,no_run
/// use orgtree::{OrgTreeProvider, OrgTreeSource};
/// use orgtree_directory::{DirectoryConfig, MemoryDirectory};
/// use std::sync::Arc;
///
/// async fn example() {
///     let directory = Arc::new(
///         MemoryDirectory::new()
///             .with_organization("o-1", "111111111111")
///             .with_root("r-1", "Root"),
///     );
///
///     let provider = OrgTreeProvider::new(directory.clone(), directory, DirectoryConfig::default())
///         .unwrap();
///     let tree = provider.org_tree().await.unwrap();
///     println!("{} accounts", tree.account_count());
/// }
/// ```
#[derive(Clone)]
pub struct OrgTreeProvider {
    builder: TreeBuilder,
    tags: Arc<dyn TagClient>,
    config: DirectoryConfig,
}

impl std::fmt::Debug for OrgTreeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrgTreeProvider")
            .field("config", &self.config)
            .finish()
    }
}

impl OrgTreeProvider {
    /// Create a provider. The configuration is validated up front.
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        tags: Arc<dyn TagClient>,
        config: DirectoryConfig,
    ) -> TreeResult<Self> {
        config.validate()?;

        Ok(Self {
            builder: TreeBuilder::new(directory),
            tags,
            config,
        })
    }

    /// Create a provider backed by the AWS Organizations and tagging APIs.
    #[cfg(feature = "aws")]
    pub fn aws(
        sdk_config: &orgtree_directory::SdkConfig,
        config: DirectoryConfig,
    ) -> TreeResult<Self> {
        use orgtree_directory::{AwsDirectory, AwsTagging};

        let directory = Arc::new(AwsDirectory::new(sdk_config, &config));
        let tags = Arc::new(AwsTagging::new(sdk_config, &config));
        Self::new(directory, tags, config)
    }

    /// The configuration in use.
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Fetch under an explicit context instead of the configured deadline.
    ///
    /// The tag lookup and the tree build run side by side. The first of the
    /// two to fail ends the fetch with its error and the other is cancelled.
    #[instrument(skip(self, ctx))]
    pub async fn org_tree_with(&self, ctx: CallContext) -> TreeResult<Organization> {
        let tag_client = self.tags.clone();
        let resource_type = self.config.account_resource_type.clone();
        let tag_task = tokio::spawn(
            async move { fetch_account_tags(tag_client.as_ref(), &ctx, &resource_type).await }
                .in_current_span(),
        );
        let tag_abort = tag_task.abort_handle();
        let tag_fetch = async move {
            match tag_task.await {
                Ok(result) => result,
                Err(e) => Err(TreeError::from(e)),
            }
        };

        let (tree, tags) = match tokio::try_join!(self.builder.build_tree(&ctx), tag_fetch) {
            Ok(joined) => joined,
            Err(e) => {
                tag_abort.abort();
                error!(error = %e, "Organization fetch failed, discarding results");
                return Err(e);
            }
        };

        let tree = apply_tags(tree, &tags);
        info!(
            organization_id = %tree.id,
            tagged_accounts = tags.len(),
            "Organization tree fetched"
        );
        Ok(tree)
    }
}

#[async_trait]
impl OrgTreeSource for OrgTreeProvider {
    async fn org_tree(&self) -> TreeResult<Organization> {
        self.org_tree_with(CallContext::from_config(&self.config)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgtree_directory::{AccountSummary, MemoryDirectory, Operation};
    use std::time::Duration;

    fn sample_directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_organization("o-1", "111")
            .with_root("r-1", "Root")
            .with_unit("r-1", "ou-1", "Infra")
            .with_account(
                "ou-1",
                AccountSummary {
                    id: "111".to_string(),
                    name: "mgmt".to_string(),
                    email: "m@example.com".to_string(),
                    status: "ACTIVE".to_string(),
                },
            )
            .with_account_tags("111", [("env", "prod")])
    }

    fn provider(directory: MemoryDirectory) -> OrgTreeProvider {
        let directory = Arc::new(directory);
        OrgTreeProvider::new(directory.clone(), directory, DirectoryConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_org_tree_is_tagged() {
        let tree = provider(sample_directory()).org_tree().await.unwrap();

        let mgmt = &tree.org_units["Root"].org_units["Infra"].accounts["mgmt"];
        assert_eq!(mgmt.tags["env"], "prod");
        assert_eq!(tree.management_account.tags["env"], "prod");
    }

    #[tokio::test]
    async fn test_tag_failure_discards_tree() {
        let directory = sample_directory().fail_on(Operation::GetResources, "");

        let err = provider(directory).org_tree().await.unwrap_err();

        assert_eq!(
            err.directory_error().map(|e| e.operation()),
            Some(Operation::GetResources)
        );
    }

    #[tokio::test]
    async fn test_build_failure_is_returned() {
        let directory = sample_directory().fail_on(Operation::ListAccountsForParent, "ou-1");

        let err = provider(directory).org_tree().await.unwrap_err();

        assert_eq!(
            err.directory_error().map(|e| e.operation()),
            Some(Operation::ListAccountsForParent)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let directory = Arc::new(sample_directory());
        let config = DirectoryConfig {
            tag_region: String::new(),
            ..DirectoryConfig::default()
        };

        let result = OrgTreeProvider::new(directory.clone(), directory, config);

        assert!(matches!(result, Err(TreeError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_tag_failure_ends_slow_build() {
        let directory = Arc::new(
            sample_directory()
                .with_latency(Duration::from_secs(10))
                .fail_on(Operation::ListChildren, "ou-1"),
        );
        let tags = Arc::new(MemoryDirectory::new().fail_on(Operation::GetResources, ""));
        let provider =
            OrgTreeProvider::new(directory.clone(), tags, DirectoryConfig::default()).unwrap();

        let start = tokio::time::Instant::now();
        let err = provider.org_tree().await.unwrap_err();

        assert_eq!(
            err.directory_error().map(|e| e.operation()),
            Some(Operation::GetResources)
        );
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(directory.call_count(Operation::ListAccountsForParent), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_build_failure_cancels_tag_fetch() {
        let directory = Arc::new(sample_directory().fail_on(Operation::DescribeOrganization, ""));
        let tags = Arc::new(
            MemoryDirectory::new()
                .with_page_size(1)
                .with_latency(Duration::from_secs(10))
                .with_account_tags("111", [("env", "prod")])
                .with_account_tags("222", [("env", "dev")]),
        );
        let provider =
            OrgTreeProvider::new(directory, tags.clone(), DirectoryConfig::default()).unwrap();

        let start = tokio::time::Instant::now();
        let err = provider.org_tree().await.unwrap_err();
        assert_eq!(
            err.directory_error().map(|e| e.operation()),
            Some(Operation::DescribeOrganization)
        );
        assert!(start.elapsed() < Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(60)).await;
        // two pages when left to finish
        assert!(tags.call_count(Operation::GetResources) <= 1);
    }
}
