//! Account tag lookup and merging.
//!
//! Tags are not part of the directory listings; they come from a separate
//! bulk lookup over every account resource. The lookup runs independently of
//! the tree walk and its result is spliced onto the finished tree by account
//! id.

use orgtree_directory::{collect_pages, CallContext, Operation, TagClient};
use orgtree_model::{AccountTags, Organization, OrganizationalUnit, Tags};
use tracing::{debug, instrument};

use crate::builder::accounts_by_id;
use crate::error::TreeResult;

/// Fetch the tags of every account resource of `resource_type`.
///
/// The account id is the trailing `/` segment of each resource ARN. If an id
/// shows up more than once the later page wins.
#[instrument(skip(tags, ctx))]
pub async fn fetch_account_tags(
    tags: &dyn TagClient,
    ctx: &CallContext,
    resource_type: &str,
) -> TreeResult<AccountTags> {
    let resources = collect_pages(ctx, Operation::GetResources, |token| {
        tags.get_resources(resource_type, token)
    })
    .await?;

    let mut by_account = AccountTags::new();
    for resource in resources {
        let account_tags: Tags = resource
            .tags
            .iter()
            .map(|tag| (tag.key.clone(), tag.value.clone()))
            .collect();
        by_account.insert(resource.resource_id().to_string(), account_tags);
    }

    debug!(accounts = by_account.len(), "Account tags fetched");
    Ok(by_account)
}

/// Attach tags to every account of `organization` listed in `tags`.
///
/// Each matching account's tag map is replaced as a whole; accounts missing
/// from `tags` keep theirs. The management account copy is refreshed the same
/// way. Applying the same mapping again yields the same tree.
///
/// # Example
///
/// ```rust
/// use orgtree::apply_tags;
/// use orgtree_model::{Account, AccountStatus, AccountTags, Organization, OrganizationalUnit, Tags};
///
/// let org = Organization::new("o-1").with_root(OrganizationalUnit::new("r-1", "Root").with_account(
///     Account::new("111", "mgmt", "m@example.com", AccountStatus::Active),
/// ));
///
/// let mut tags = AccountTags::new();
/// tags.insert("111".to_string(), Tags::from([("env".to_string(), "prod".to_string())]));
///
/// let tagged = apply_tags(org, &tags);
/// assert_eq!(tagged.org_units["Root"].accounts["mgmt"].tags["env"], "prod");
/// ```
pub fn apply_tags(mut organization: Organization, tags: &AccountTags) -> Organization {
    let unmatched = {
        let known = accounts_by_id(&organization);
        tags.keys()
            .filter(|id| !known.contains_key(id.as_str()))
            .count()
    };
    if unmatched > 0 {
        debug!(unmatched, "Tagged accounts not present in the tree");
    }

    organization.org_units = organization
        .org_units
        .into_iter()
        .map(|(name, unit)| (name, tag_unit(unit, tags)))
        .collect();

    if let Some(account_tags) = tags.get(&organization.management_account.id) {
        organization.management_account.tags = account_tags.clone();
    }

    organization
}

fn tag_unit(mut unit: OrganizationalUnit, tags: &AccountTags) -> OrganizationalUnit {
    for account in unit.accounts.values_mut() {
        if let Some(account_tags) = tags.get(&account.id) {
            account.tags = account_tags.clone();
        }
    }

    unit.org_units = unit
        .org_units
        .into_iter()
        .map(|(name, child)| (name, tag_unit(child, tags)))
        .collect();

    unit
}
