//! Concurrent construction of the organization tree.
//!
//! The walk starts at every root and, for each unit, lists the unit's direct
//! accounts while listing its child units and walking each child in its own
//! task. A unit is assembled only once all of its children have reported, so
//! every node a caller can observe is complete.
//!
//! ## Failure handling
//!
//! The first failed remote call ends the walk. The unit that observes it
//! aborts its outstanding child tasks, drains them, and returns the error to
//! its parent, which does the same, up to [`TreeBuilder::build_tree`]. No
//! partial tree is returned.
//!
//! ```text
//! build_tree
//!   ├─ DescribeOrganization ─┐ (joined)
//!   ├─ ListRoots ────────────┘
//!   └─ walk(root) × N                     one task per root
//!        ├─ ListAccountsForParent ───┐ (joined)
//!        └─ ListChildren ────────────┘
//!             └─ DescribeOrganizationalUnit + walk(child) × M   one task per child
//! ```

use futures::future::{BoxFuture, FutureExt};
use orgtree_directory::{
    collect_pages, AccountSummary, CallContext, ChildType, DirectoryClient, Operation,
    UnitSummary,
};
use orgtree_model::{Account, AccountStatus, Organization, OrganizationalUnit};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn, Instrument};

use crate::error::{TreeError, TreeResult};

/// A finished unit together with the management account found beneath it.
#[derive(Debug)]
struct UnitWalk {
    unit: OrganizationalUnit,
    management: Option<Account>,
}

/// State shared read-only by every task of one walk.
#[derive(Clone)]
struct WalkScope {
    directory: Arc<dyn DirectoryClient>,
    ctx: CallContext,
    management_account_id: Arc<str>,
}

/// Builds [`Organization`] trees from a [`DirectoryClient`].
///
/// # Example
///
/// ```rust,no_run
/// use orgtree::TreeBuilder;
/// use orgtree_directory::{CallContext, MemoryDirectory};
/// use std::sync::Arc;
///
/// async fn example() {
///     let directory = MemoryDirectory::new()
///         .with_organization("o-1", "111111111111")
///         .with_root("r-1", "Root");
///
///     let builder = TreeBuilder::new(Arc::new(directory));
///     let tree = builder.build_tree(&CallContext::new()).await.unwrap();
///     assert!(tree.org_units.contains_key("Root"));
/// }
/// ```
#[derive(Clone)]
pub struct TreeBuilder {
    directory: Arc<dyn DirectoryClient>,
}

impl std::fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder").finish()
    }
}

impl TreeBuilder {
    /// Create a builder reading from `directory`.
    pub fn new(directory: Arc<dyn DirectoryClient>) -> Self {
        Self { directory }
    }

    /// Walk the whole organization and assemble its tree.
    ///
    /// Accounts come back untagged. Any failed remote call fails the build.
    #[instrument(skip(self, ctx))]
    pub async fn build_tree(&self, ctx: &CallContext) -> TreeResult<Organization> {
        let start = Instant::now();

        let (summary, roots) = tokio::try_join!(
            ctx.call(
                Operation::DescribeOrganization,
                self.directory.describe_organization()
            ),
            collect_pages(ctx, Operation::ListRoots, |token| {
                self.directory.list_roots(token)
            }),
        )?;

        debug!(
            organization_id = %summary.id,
            roots = roots.len(),
            "Organization described"
        );

        let scope = WalkScope {
            directory: self.directory.clone(),
            ctx: *ctx,
            management_account_id: Arc::from(summary.management_account_id.as_str()),
        };

        let mut tasks = JoinSet::new();
        for root in roots {
            let unit = UnitSummary {
                id: root.id,
                name: root.name,
            };
            tasks.spawn(walk_unit(scope.clone(), unit, 0).in_current_span());
        }
        let walks = join_all(&mut tasks).await?;

        let mut organization = Organization::new(summary.id);
        for walk in walks {
            if let Some(management) = walk.management {
                organization.management_account = management;
            }
            let name = walk.unit.name.clone();
            if let Some(previous) = organization.org_units.insert(name, walk.unit) {
                warn!(
                    name = %previous.name,
                    id = %previous.id,
                    "Root name collision, keeping the later root"
                );
            }
        }

        if !organization.has_management_account() {
            warn!(
                management_account_id = %scope.management_account_id,
                "Management account not found in the tree"
            );
        }

        info!(
            organization_id = %organization.id,
            units = organization.unit_count(),
            accounts = organization.account_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Organization tree built"
        );

        Ok(organization)
    }
}

/// Walk one unit and everything beneath it.
fn walk_unit(
    scope: WalkScope,
    unit: UnitSummary,
    depth: usize,
) -> BoxFuture<'static, TreeResult<UnitWalk>> {
    let span = tracing::debug_span!("walk_unit", unit_id = %unit.id, depth);

    async move {
        let (accounts, children) = tokio::try_join!(
            list_accounts(&scope, &unit.id),
            walk_children(&scope, &unit.id, depth),
        )?;

        let mut node = OrganizationalUnit::new(unit.id, unit.name);
        let mut management = None;

        for child in children {
            if child.management.is_some() {
                management = child.management;
            }
            if let Some(previous) = node.insert_unit(child.unit) {
                warn!(
                    name = %previous.name,
                    id = %previous.id,
                    "Unit name collision, keeping the later unit"
                );
            }
        }

        for account in accounts {
            if account.id == *scope.management_account_id {
                management = Some(account.clone());
            }
            if let Some(previous) = node.insert_account(account) {
                warn!(
                    name = %previous.name,
                    id = %previous.id,
                    "Account name collision, keeping the later account"
                );
            }
        }

        debug!(
            units = node.org_units.len(),
            accounts = node.accounts.len(),
            "Unit assembled"
        );

        Ok(UnitWalk { unit: node, management })
    }
    .instrument(span)
    .boxed()
}

/// List the accounts placed directly under `parent_id`.
async fn list_accounts(scope: &WalkScope, parent_id: &str) -> TreeResult<Vec<Account>> {
    let summaries = collect_pages(&scope.ctx, Operation::ListAccountsForParent, |token| {
        scope.directory.list_accounts_for_parent(parent_id, token)
    })
    .await?;

    Ok(summaries.into_iter().map(account_from_summary).collect())
}

/// List the child units of `parent_id` and walk each one in its own task.
async fn walk_children(
    scope: &WalkScope,
    parent_id: &str,
    depth: usize,
) -> TreeResult<Vec<UnitWalk>> {
    let children = collect_pages(&scope.ctx, Operation::ListChildren, |token| {
        scope
            .directory
            .list_children(parent_id, ChildType::OrganizationalUnit, token)
    })
    .await?;

    let mut tasks = JoinSet::new();
    for child in children {
        let scope = scope.clone();
        let task = async move {
            let unit = scope
                .ctx
                .call(
                    Operation::DescribeOrganizationalUnit,
                    scope.directory.describe_organizational_unit(&child.id),
                )
                .await?;
            walk_unit(scope, unit, depth + 1).await
        };
        tasks.spawn(task.in_current_span());
    }

    join_all(&mut tasks).await
}

/// Collect every task result, stopping at the first failure.
///
/// On failure the remaining tasks are aborted and drained before the error
/// is returned.
async fn join_all<T: 'static>(tasks: &mut JoinSet<TreeResult<T>>) -> TreeResult<Vec<T>> {
    let mut results = Vec::with_capacity(tasks.len());

    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(TreeError::from).and_then(|result| result) {
            Ok(value) => results.push(value),
            Err(e) => {
                tasks.abort_all();
                let mut discarded = 0usize;
                while tasks.join_next().await.is_some() {
                    discarded += 1;
                }
                if discarded > 0 {
                    warn!(discarded, error = %e, "Discarded sibling subtrees after failure");
                }
                return Err(e);
            }
        }
    }

    Ok(results)
}

fn account_from_summary(summary: AccountSummary) -> Account {
    let status = AccountStatus::parse(&summary.status);
    Account::new(summary.id, summary.name, summary.email, status)
}

/// Index accounts by id across the whole tree.
pub(crate) fn accounts_by_id(organization: &Organization) -> BTreeMap<&str, &Account> {
    fn visit<'a>(unit: &'a OrganizationalUnit, out: &mut BTreeMap<&'a str, &'a Account>) {
        for account in unit.accounts.values() {
            out.insert(account.id.as_str(), account);
        }
        for child in unit.org_units.values() {
            visit(child, out);
        }
    }

    let mut out = BTreeMap::new();
    for root in organization.org_units.values() {
        visit(root, &mut out);
    }
    out
}
