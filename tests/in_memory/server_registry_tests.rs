//! In-memory integration tests for the server registries.

use super::helpers::{registry, user_delivery, webview};
use notiflink::bootstrap::InMemoryRegistry;
use notiflink::envelope::{Classify, ErrorClass};
use notiflink::server::{
    ports::ServerRepositoryError,
    services::{ServerListQuery, ServerRegistryServiceError},
};
use notiflink::status::Status;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_returns_requested_page_and_total(registry: InMemoryRegistry) {
    for name in ["S1", "S2", "S3", "S4", "S5"] {
        registry
            .webview_servers
            .create(name)
            .await
            .expect("server should be created");
    }

    let page = registry
        .webview_servers
        .list(ServerListQuery::new(
            registry.page_request(Some("2"), Some("1")),
        ))
        .await
        .expect("listing should succeed");

    let names: Vec<&str> = page.items().iter().map(|s| s.name().as_str()).collect();
    assert_eq!(names, ["S3", "S4"]);
    assert_eq!(page.total(), 5);
    assert_eq!(page.pagination().limit, 2);
    assert_eq!(page.pagination().page, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_name_within_kind_is_a_conflict(registry: InMemoryRegistry) {
    registry
        .webview_servers
        .create("W1")
        .await
        .expect("first server should be created");

    let err = registry
        .webview_servers
        .create("  W1  ")
        .await
        .expect_err("trimmed duplicate should be rejected");

    assert!(matches!(
        err,
        ServerRegistryServiceError::Repository(ServerRepositoryError::DuplicateName { .. })
    ));
    assert_eq!(err.classify(), ErrorClass::Conflict);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_name_is_allowed_across_kinds(registry: InMemoryRegistry) {
    let webview_server = webview(&registry, "edge", "inactive").await;
    let user_delivery_server = user_delivery(&registry, "edge", "inactive").await;

    assert_eq!(webview_server.name(), user_delivery_server.name());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn keyword_and_status_filters_combine(registry: InMemoryRegistry) {
    webview(&registry, "Alpha-North", "active").await;
    webview(&registry, "alpha-south", "inactive").await;
    webview(&registry, "Beta", "active").await;

    let query = ServerListQuery::new(registry.page_request(None, None))
        .with_keyword("ALPHA")
        .with_status("active");
    let page = registry
        .webview_servers
        .list(query)
        .await
        .expect("listing should succeed");

    assert_eq!(page.total(), 1);
    let only = page.items().first().expect("one match");
    assert_eq!(only.name().as_str(), "Alpha-North");
    assert_eq!(only.status(), Status::Active);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_releases_previous_name(registry: InMemoryRegistry) {
    let server = webview(&registry, "old", "inactive").await;

    let renamed = registry
        .webview_servers
        .rename(server.id(), "new")
        .await
        .expect("rename should succeed");
    assert_eq!(renamed.name().as_str(), "new");

    registry
        .webview_servers
        .create("old")
        .await
        .expect("released name should be reusable");
    let fetched = registry
        .webview_servers
        .get(server.id())
        .await
        .expect("renamed server should still exist");
    assert_eq!(fetched.name().as_str(), "new");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_status_text_is_a_validation_error(registry: InMemoryRegistry) {
    let server = user_delivery(&registry, "U1", "inactive").await;

    let err = registry
        .user_delivery_servers
        .set_status(server.id(), "enabled")
        .await
        .expect_err("unknown status should be rejected");

    assert_eq!(err.classify(), ErrorClass::Validation);
}
