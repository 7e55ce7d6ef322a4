//! End-to-end tests for organization tree fetches.
//!
//! These tests drive `OrgTreeProvider` against an in-memory directory and
//! check the assembled, tagged tree together with the failure behavior of
//! the whole fetch.
//!
//! Scenarios:
//! 1. Basic fetch: one root, one unit, the management account, its tags
//! 2. Name collisions within one unit
//! 3. Failures at depth and in the tag lookup
//! 4. Deadlines
//! 5. Pagination
//! 6. Determinism of tagging and flattening

use orgtree::{apply_tags, OrgTreeProvider, OrgTreeSource, OrganizationalUnit, TreeError};
use orgtree_directory::{
    AccountSummary, DirectoryConfig, DirectoryError, MemoryDirectory, Operation,
};
use std::sync::Arc;
use std::time::Duration;

/// Test fixture wrapping an in-memory directory.
struct TestFixture {
    /// Directory serving both the tree and the tags.
    directory: Arc<MemoryDirectory>,
    /// Fetch configuration.
    config: DirectoryConfig,
}

impl TestFixture {
    /// Create a fixture around `directory` with the default configuration.
    fn new(directory: MemoryDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
            config: DirectoryConfig::default(),
        }
    }

    /// Override the fetch timeout.
    fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    /// Build a provider over the fixture directory.
    fn provider(&self) -> OrgTreeProvider {
        OrgTreeProvider::new(
            self.directory.clone(),
            self.directory.clone(),
            self.config.clone(),
        )
        .expect("valid config")
    }
}

fn account(id: &str, name: &str) -> AccountSummary {
    AccountSummary {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name),
        status: "ACTIVE".to_string(),
    }
}

/// Organization `o-1` with root "Root", unit "Infra" and the management
/// account tagged `env=prod`.
fn basic_directory() -> MemoryDirectory {
    MemoryDirectory::new()
        .with_organization("o-1", "111111111111")
        .with_root("r-1", "Root")
        .with_unit("r-1", "ou-1", "Infra")
        .with_account("ou-1", account("111111111111", "mgmt"))
        .with_account_tags("111111111111", [("env", "prod")])
}

/// Four unit levels below the root, with a sibling branch at every level.
fn deep_directory() -> MemoryDirectory {
    MemoryDirectory::new()
        .with_organization("o-1", "100")
        .with_root("r-1", "Root")
        .with_account("r-1", account("100", "mgmt"))
        .with_unit("r-1", "ou-a", "A")
        .with_unit("r-1", "ou-a2", "A2")
        .with_unit("ou-a", "ou-b", "B")
        .with_unit("ou-a", "ou-b2", "B2")
        .with_unit("ou-b", "ou-c", "C")
        .with_unit("ou-b", "ou-c2", "C2")
        .with_unit("ou-c", "ou-d", "D")
        .with_account("ou-a2", account("201", "a2-app"))
        .with_account("ou-b2", account("202", "b2-app"))
        .with_account("ou-c2", account("203", "c2-app"))
        .with_account("ou-d", account("204", "d-app"))
}

fn assert_fully_populated(unit: &OrganizationalUnit) {
    for (name, child) in &unit.org_units {
        assert_eq!(&child.name, name);
        assert!(!child.id.is_empty());
        for (account_name, account) in &child.accounts {
            assert_eq!(&account.name, account_name);
        }
        assert_fully_populated(child);
    }
}

// =============================================================================
// Test 1: Basic fetch
// =============================================================================

/// The management account is found in the tree and carries its tags.
#[tokio::test]
async fn test_basic_fetch_tags_management_account() {
    let fixture = TestFixture::new(basic_directory());

    let tree = fixture.provider().org_tree().await.unwrap();

    assert_eq!(tree.id, "o-1");
    assert_eq!(tree.management_account.id, "111111111111");

    let mgmt = &tree.org_units["Root"].org_units["Infra"].accounts["mgmt"];
    assert_eq!(mgmt.id, "111111111111");
    assert_eq!(mgmt.tags.len(), 1);
    assert_eq!(mgmt.tags["env"], "prod");
    assert!(tree.org_units["Root"].accounts.is_empty());
}

/// Every unit below every root is present and complete.
#[tokio::test]
async fn test_every_unit_is_populated() {
    let fixture = TestFixture::new(deep_directory());

    let tree = fixture.provider().org_tree().await.unwrap();

    assert_eq!(tree.unit_count(), 8);
    assert_eq!(tree.account_count(), 5);
    for root in tree.org_units.values() {
        assert_fully_populated(root);
    }

    let d = &tree.org_units["Root"].org_units["A"].org_units["B"].org_units["C"].org_units["D"];
    assert_eq!(d.id, "ou-d");
    assert_eq!(d.accounts["d-app"].id, "204");
}

/// Accounts without tag entries come back with empty tag maps.
#[tokio::test]
async fn test_untagged_accounts_have_empty_tags() {
    let fixture = TestFixture::new(deep_directory());

    let tree = fixture.provider().org_tree().await.unwrap();

    for info in tree.accounts().values() {
        assert!(info.tags.is_empty(), "{} should be untagged", info.name);
    }
}

// =============================================================================
// Test 2: Name collisions
// =============================================================================

/// Two direct accounts with the same name collapse into one entry.
#[tokio::test]
async fn test_same_name_accounts_keep_one_entry() {
    let directory = MemoryDirectory::new()
        .with_organization("o-1", "111")
        .with_root("r-1", "Root")
        .with_account("r-1", account("111", "mgmt"))
        .with_account("r-1", account("222", "shared"))
        .with_account("r-1", account("333", "shared"));
    let fixture = TestFixture::new(directory);

    let tree = fixture.provider().org_tree().await.unwrap();

    let root = &tree.org_units["Root"];
    assert_eq!(root.accounts.len(), 2);
    assert_eq!(root.accounts["shared"].id, "333");
}

// =============================================================================
// Test 3: Failures
// =============================================================================

/// A child listing failing three levels deep fails the whole fetch.
#[tokio::test]
async fn test_deep_list_children_failure_fails_fetch() {
    let directory = deep_directory().fail_on(Operation::ListChildren, "ou-b");
    let fixture = TestFixture::new(directory);

    let err = fixture.provider().org_tree().await.unwrap_err();

    let directory_error = err.directory_error().expect("directory error");
    assert_eq!(directory_error.operation(), Operation::ListChildren);
    assert!(matches!(directory_error, DirectoryError::Remote { .. }));
}

/// A failed unit description fails the whole fetch.
#[tokio::test]
async fn test_describe_unit_failure_fails_fetch() {
    let directory = deep_directory().fail_on(Operation::DescribeOrganizationalUnit, "ou-c2");
    let fixture = TestFixture::new(directory);

    let err = fixture.provider().org_tree().await.unwrap_err();

    assert_eq!(
        err.directory_error().map(DirectoryError::operation),
        Some(Operation::DescribeOrganizationalUnit)
    );
}

/// A tag lookup failure discards an otherwise complete tree.
#[tokio::test]
async fn test_tag_failure_discards_tree() {
    let directory = basic_directory().fail_with(
        Operation::GetResources,
        "",
        None,
        DirectoryError::Throttled {
            operation: Operation::GetResources,
            message: "rate exceeded".to_string(),
        },
    );
    let fixture = TestFixture::new(directory);

    let err = fixture.provider().org_tree().await.unwrap_err();

    assert!(matches!(
        err,
        TreeError::Directory(DirectoryError::Throttled { .. })
    ));
}

/// Not being part of an organization surfaces as access denied.
#[tokio::test]
async fn test_missing_organization_is_access_denied() {
    let directory = MemoryDirectory::new().with_root("r-1", "Root");
    let fixture = TestFixture::new(directory);

    let err = fixture.provider().org_tree().await.unwrap_err();

    assert!(matches!(
        err.directory_error(),
        Some(DirectoryError::AccessDenied { .. })
    ));
}

// =============================================================================
// Test 4: Deadlines
// =============================================================================

/// Calls slower than the fetch deadline fail with a deadline error.
#[tokio::test(start_paused = true)]
async fn test_deadline_expiry_fails_fetch() {
    let directory = basic_directory().with_latency(Duration::from_secs(10));
    let fixture = TestFixture::new(directory).with_timeout_secs(5);

    let err = fixture.provider().org_tree().await.unwrap_err();

    assert!(err
        .directory_error()
        .map_or(false, DirectoryError::is_deadline_exceeded));
}

/// Slow calls within the deadline still succeed.
#[tokio::test(start_paused = true)]
async fn test_slow_calls_within_deadline_succeed() {
    let directory = basic_directory().with_latency(Duration::from_millis(50));
    let fixture = TestFixture::new(directory).with_timeout_secs(60);

    let tree = fixture.provider().org_tree().await.unwrap();

    assert_eq!(tree.management_account.tags["env"], "prod");
}

// =============================================================================
// Test 5: Pagination
// =============================================================================

/// Every page of every listing is consumed.
#[tokio::test]
async fn test_all_pages_are_consumed() {
    let mut directory = MemoryDirectory::new()
        .with_page_size(2)
        .with_organization("o-1", "a-0")
        .with_root("r-1", "Root")
        .with_root("r-2", "Sandbox");
    for i in 0..7 {
        directory = directory
            .with_account("r-1", account(&format!("a-{}", i), &format!("acct-{}", i)))
            .with_account_tags(&format!("a-{}", i), [("index", i.to_string())]);
    }
    for i in 0..5 {
        directory = directory.with_unit("r-2", format!("ou-{}", i), format!("Unit {}", i));
    }
    let fixture = TestFixture::new(directory);

    let tree = fixture.provider().org_tree().await.unwrap();

    assert_eq!(tree.org_units.len(), 2);
    assert_eq!(tree.org_units["Root"].accounts.len(), 7);
    assert_eq!(tree.org_units["Sandbox"].org_units.len(), 5);
    assert_eq!(tree.org_units["Root"].accounts["acct-6"].tags["index"], "6");
    // 7 accounts in pages of 2
    assert!(fixture.directory.call_count(Operation::GetResources) >= 4);
}

/// A page failing mid-listing fails the fetch with the page named.
#[tokio::test]
async fn test_mid_listing_page_failure() {
    let directory = MemoryDirectory::new()
        .with_page_size(1)
        .with_organization("o-1", "1")
        .with_root("r-1", "Root")
        .with_account("r-1", account("1", "a"))
        .with_account("r-1", account("2", "b"))
        .with_account("r-1", account("3", "c"))
        .fail_with(
            Operation::ListAccountsForParent,
            "r-1",
            Some(1),
            DirectoryError::remote(Operation::ListAccountsForParent, "connection reset"),
        );
    let fixture = TestFixture::new(directory);

    let err = fixture.provider().org_tree().await.unwrap_err();

    match err.directory_error() {
        Some(DirectoryError::Pagination {
            operation, page, ..
        }) => {
            assert_eq!(*operation, Operation::ListAccountsForParent);
            assert_eq!(*page, 1);
        }
        other => panic!("expected a pagination error, got {:?}", other),
    }
}

// =============================================================================
// Test 6: Determinism
// =============================================================================

/// Tagging a fetched tree again with the same tags changes nothing.
#[tokio::test]
async fn test_tagging_is_idempotent() {
    let fixture = TestFixture::new(basic_directory());
    let tree = fixture.provider().org_tree().await.unwrap();

    let tags = orgtree::fetch_account_tags(
        fixture.directory.as_ref(),
        &orgtree_directory::CallContext::new(),
        orgtree_directory::ACCOUNT_RESOURCE_TYPE,
    )
    .await
    .unwrap();

    let retagged = apply_tags(tree.clone(), &tags);
    assert_eq!(retagged, tree);
}

/// Two fetches of the same directory flatten identically.
#[tokio::test]
async fn test_flattening_is_deterministic() {
    let fixture = TestFixture::new(deep_directory());
    let provider = fixture.provider();

    let first = provider.org_tree().await.unwrap();
    let second = provider.org_tree().await.unwrap();

    assert_eq!(first.org_units_info(), second.org_units_info());
    assert_eq!(first.accounts(), second.accounts());

    let d_app = &first.accounts()["d-app"];
    assert_eq!(d_app.ou_name_path, vec!["Root", "A", "B", "C", "D"]);
    assert_eq!(d_app.org, "o-1");
}
