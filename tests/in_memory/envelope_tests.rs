//! Rendering service results into response envelopes.

use super::helpers::{connect, registry, user_delivery, webview};
use notiflink::bootstrap::InMemoryRegistry;
use notiflink::connection::services::ConnectionListQuery;
use notiflink::envelope::Envelope;
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_server_renders_as_success(registry: InMemoryRegistry) {
    let result = registry.webview_servers.create("W1").await;

    let envelope = Envelope::from_result(result).expect("payload serializes");

    assert_eq!(envelope.code, 200);
    assert_eq!(envelope.message, "success");
    assert_eq!(envelope.data["name"], json!("W1"));
    assert_eq!(envelope.data["status"], json!("inactive"));
    assert!(envelope.data["createdAt"].is_string());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_server_renders_as_conflict(registry: InMemoryRegistry) {
    webview(&registry, "W1", "inactive").await;

    let result = registry.webview_servers.create("W1").await;
    let envelope = Envelope::from_result(result).expect("payload serializes");

    assert_eq!(envelope.code, 409);
    assert!(envelope.message.contains("W1"));
    assert_eq!(envelope.data, json!({}));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocked_activation_renders_as_precondition_failure(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "inactive").await;
    let u1 = user_delivery(&registry, "U1", "inactive").await;
    let connection = connect(&registry, &w1, &u1, "inactive").await;

    let result = registry
        .connections
        .set_status(connection.id(), "active")
        .await;
    let envelope = Envelope::from_result(result).expect("payload serializes");

    assert_eq!(envelope.code, 412);
    assert!(envelope.message.contains("not active"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connection_listing_renders_list_and_pagination(registry: InMemoryRegistry) {
    let w1 = webview(&registry, "W1", "active").await;
    let u1 = user_delivery(&registry, "U1", "active").await;
    let connection = connect(&registry, &w1, &u1, "active").await;

    let result = registry
        .connections
        .list(ConnectionListQuery::new(
            u1.id(),
            registry.page_request(Some("5"), None),
        ))
        .await;
    let envelope = Envelope::from_result(result).expect("payload serializes");

    assert_eq!(envelope.code, 200);
    assert_eq!(
        envelope.data["pagination"],
        json!({"limit": 5, "page": 0, "total": 1})
    );
    let entry = &envelope.data["list"][0];
    assert_eq!(entry["id"], json!(connection.id().to_string()));
    assert_eq!(entry["webviewServerId"], json!(w1.id().to_string()));
    assert_eq!(entry["webviewServer"]["name"], json!("W1"));
    assert_eq!(entry["userDeliveryServer"]["name"], json!("U1"));
    assert_eq!(entry["status"], json!("active"));
    assert_eq!(entry.get("userDeliveryServerWebHookUrl"), None::<&Value>);
}
