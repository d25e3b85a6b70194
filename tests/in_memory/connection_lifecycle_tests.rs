//! In-memory integration tests for the connection lifecycle.

use super::helpers::{connect, pair_request, registry, user_delivery, webview};
use notiflink::bootstrap::InMemoryRegistry;
use notiflink::connection::{
    domain::ConnectionDomainError,
    ports::ConnectionRepositoryError,
    services::{ConnectionListQuery, ConnectionServiceError, CreateConnectionRequest},
};
use notiflink::envelope::{Classify, ErrorClass};
use notiflink::server::domain::{ServerId, ServerRef, UserDelivery};
use notiflink::status::Status;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activation_waits_for_both_servers(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "inactive").await;
    let u1 = user_delivery(&registry, "U1", "inactive").await;

    let connection = registry
        .connections
        .create(pair_request(&w1, &u1))
        .await
        .expect("connection should be created");
    assert_eq!(connection.status(), Status::Inactive);
    assert_eq!(connection.webview_server_api_key().as_str().len(), 64);
    assert_ne!(
        connection.webview_server_api_key(),
        connection.user_delivery_server_api_key()
    );

    let err = registry
        .connections
        .set_status(connection.id(), "active")
        .await
        .expect_err("inactive servers should block activation");
    assert!(matches!(
        err,
        ConnectionServiceError::ServerNotActive(ServerRef::UserDelivery(id)) if id == u1.id()
    ));
    assert_eq!(err.classify(), ErrorClass::Precondition);

    registry
        .user_delivery_servers
        .set_status(u1.id(), "active")
        .await
        .expect("user delivery server should activate");
    let webview_err = registry
        .connections
        .set_status(connection.id(), "active")
        .await
        .expect_err("inactive webview should still block activation");
    assert!(matches!(
        webview_err,
        ConnectionServiceError::ServerNotActive(ServerRef::Webview(id)) if id == w1.id()
    ));

    registry
        .webview_servers
        .set_status(w1.id(), "active")
        .await
        .expect("webview server should activate");
    let active = registry
        .connections
        .set_status(connection.id(), "active")
        .await
        .expect("activation should succeed once both servers are active");
    assert_eq!(active.status(), Status::Active);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_connection_for_same_pair_conflicts(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    connect(&registry, &w1, &u1, "inactive").await;

    let err = registry
        .connections
        .create(pair_request(&w1, &u1).with_webhook_url("https://hooks.example.com/a"))
        .await
        .expect_err("pair should be unique");

    assert!(matches!(
        err,
        ConnectionServiceError::Repository(ConnectionRepositoryError::DuplicatePair(_))
    ));
    assert_eq!(err.classify(), ErrorClass::Conflict);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_webview_may_pair_with_many_user_delivery_servers(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let u2 = user_delivery(&registry, "U2", "active").await;

    let first = connect(&registry, &w1, &u1, "active").await;
    let second = connect(&registry, &w1, &u2, "active").await;

    assert_ne!(first.id(), second.id());
    assert_eq!(first.webview_server_id(), second.webview_server_id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_webview_id_is_a_validation_error(registry: InMemoryRegistry) {
    let u1 = user_delivery(&registry, "U1", "active").await;

    let err = registry
        .connections
        .create(CreateConnectionRequest::new(u1.id().to_string()).with_webview_server_id("  "))
        .await
        .expect_err("blank webview id should be rejected");

    assert!(matches!(
        err,
        ConnectionServiceError::Domain(ConnectionDomainError::MissingWebviewServerId)
    ));
    assert_eq!(err.classify(), ErrorClass::Validation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_user_delivery_server_is_not_found(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let missing = ServerId::<UserDelivery>::new();

    let err = registry
        .connections
        .create(
            CreateConnectionRequest::new(missing.to_string())
                .with_webview_server_id(w1.id().to_string()),
        )
        .await
        .expect_err("unknown server should be rejected");

    assert!(matches!(
        err,
        ConnectionServiceError::ServerNotFound(ServerRef::UserDelivery(id)) if id == missing
    ));
    assert_eq!(err.classify(), ErrorClass::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_includes_both_server_summaries(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let w2 = webview(&registry, "W2", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    connect(&registry, &w1, &u1, "active").await;
    connect(&registry, &w2, &u1, "inactive").await;

    let page = registry
        .connections
        .list(
            ConnectionListQuery::new(u1.id(), registry.page_request(None, None))
                .with_status("active"),
        )
        .await
        .expect("listing should succeed");

    assert_eq!(page.total(), 1);
    let view = page.items().first().expect("one connection");
    let webview_summary = view.webview_server.as_ref().expect("webview summary");
    let user_delivery_summary = view
        .user_delivery_server
        .as_ref()
        .expect("user delivery summary");
    assert_eq!(webview_summary.name.as_str(), "W1");
    assert_eq!(user_delivery_summary.id, u1.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unparseable_webview_filter_is_ignored(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let w2 = webview(&registry, "W2", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    connect(&registry, &w1, &u1, "inactive").await;
    connect(&registry, &w2, &u1, "inactive").await;

    let unfiltered = registry
        .connections
        .list(
            ConnectionListQuery::new(u1.id(), registry.page_request(None, None))
                .with_webview_server_id("not-a-uuid"),
        )
        .await
        .expect("listing should succeed");
    let filtered = registry
        .connections
        .list(
            ConnectionListQuery::new(u1.id(), registry.page_request(None, None))
                .with_webview_server_id(w2.id().to_string()),
        )
        .await
        .expect("listing should succeed");

    assert_eq!(unfiltered.total(), 2);
    assert_eq!(filtered.total(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn webhook_can_be_replaced_but_not_with_garbage(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "inactive").await;
    let u1 = user_delivery(&registry, "U1", "inactive").await;
    let connection = connect(&registry, &w1, &u1, "inactive").await;

    let updated = registry
        .connections
        .update_webhook_url(connection.id(), "https://hooks.example.com/notify")
        .await
        .expect("webhook should be updated");
    assert_eq!(
        updated.webhook_url().map(|url| url.as_str()),
        Some("https://hooks.example.com/notify")
    );

    let err = registry
        .connections
        .update_webhook_url(connection.id(), "not a url")
        .await
        .expect_err("garbage webhook should be rejected");
    assert_eq!(err.classify(), ErrorClass::Validation);

    let stored = registry
        .connections
        .get(connection.id())
        .await
        .expect("connection should exist");
    assert_eq!(stored.webhook_url(), updated.webhook_url());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivation_has_no_precondition(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let connection = connect(&registry, &w1, &u1, "active").await;

    registry
        .connections
        .set_status(connection.id(), "inactive")
        .await
        .expect("deactivation should succeed");

    let stored = registry
        .connections
        .get(connection.id())
        .await
        .expect("connection should exist");
    assert_eq!(stored.status(), Status::Inactive);
}
