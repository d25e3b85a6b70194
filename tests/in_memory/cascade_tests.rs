//! Server deactivation cascading to dependent connections.

use super::helpers::{connect, registry, user_delivery, webview};
use notiflink::bootstrap::InMemoryRegistry;
use notiflink::status::Status;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivating_webview_server_deactivates_its_connections(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let w2 = webview(&registry, "W2", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let u2 = user_delivery(&registry, "U2", "active").await;
    let first = connect(&registry, &w1, &u1, "active").await;
    let second = connect(&registry, &w1, &u2, "active").await;
    let unrelated = connect(&registry, &w2, &u1, "active").await;

    registry
        .webview_servers
        .set_status(w1.id(), "inactive")
        .await
        .expect("deactivation should succeed");

    for id in [first.id(), second.id()] {
        let stored = registry.connections.get(id).await.expect("connection exists");
        assert_eq!(stored.status(), Status::Inactive);
    }
    let untouched = registry
        .connections
        .get(unrelated.id())
        .await
        .expect("connection exists");
    assert_eq!(untouched.status(), Status::Active);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivating_user_delivery_server_deactivates_its_connections(
    registry: InMemoryRegistry,
) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let connection = connect(&registry, &w1, &u1, "active").await;

    registry
        .user_delivery_servers
        .set_status(u1.id(), "inactive")
        .await
        .expect("deactivation should succeed");

    let stored = registry
        .connections
        .get(connection.id())
        .await
        .expect("connection exists");
    assert_eq!(stored.status(), Status::Inactive);
    assert!(stored.updated_at() >= connection.updated_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reactivating_server_leaves_connections_inactive(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let connection = connect(&registry, &w1, &u1, "active").await;

    registry
        .webview_servers
        .set_status(w1.id(), "inactive")
        .await
        .expect("deactivation should succeed");
    registry
        .webview_servers
        .set_status(w1.id(), "active")
        .await
        .expect("reactivation should succeed");

    let stored = registry
        .connections
        .get(connection.id())
        .await
        .expect("connection exists");
    assert_eq!(stored.status(), Status::Inactive);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connection_cannot_be_reactivated_while_server_is_inactive(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let connection = connect(&registry, &w1, &u1, "active").await;

    registry
        .user_delivery_servers
        .set_status(u1.id(), "inactive")
        .await
        .expect("deactivation should succeed");

    let result = registry
        .connections
        .set_status(connection.id(), "active")
        .await;
    assert!(result.is_err());
}
