//! Shared helpers for in-memory registry integration tests.

use notiflink::bootstrap::InMemoryRegistry;
use notiflink::config::Config;
use notiflink::connection::{domain::Connection, services::CreateConnectionRequest};
use notiflink::server::domain::{Server, UserDelivery, Webview};
use rstest::fixture;

/// Provides a fully wired in-memory registry with default configuration.
#[fixture]
pub fn registry() -> InMemoryRegistry {
    InMemoryRegistry::in_memory(&Config::default())
}

/// Creates a webview server and moves it to `status`.
///
/// # Panics
///
/// Panics if creation or the status change fails.
pub async fn webview(registry: &InMemoryRegistry, name: &str, status: &str) -> Server<Webview> {
    let server = registry
        .webview_servers
        .create(name)
        .await
        .expect("webview server should be created");
    registry
        .webview_servers
        .set_status(server.id(), status)
        .await
        .expect("webview status should be set")
}

/// Creates a user-delivery server and moves it to `status`.
///
/// # Panics
///
/// Panics if creation or the status change fails.
pub async fn user_delivery(
    registry: &InMemoryRegistry,
    name: &str,
    status: &str,
) -> Server<UserDelivery> {
    let server = registry
        .user_delivery_servers
        .create(name)
        .await
        .expect("user delivery server should be created");
    registry
        .user_delivery_servers
        .set_status(server.id(), status)
        .await
        .expect("user delivery status should be set")
}

/// Builds a creation request pairing two servers.
pub fn pair_request(
    webview: &Server<Webview>,
    user_delivery: &Server<UserDelivery>,
) -> CreateConnectionRequest {
    CreateConnectionRequest::new(user_delivery.id().to_string())
        .with_webview_server_id(webview.id().to_string())
}

/// Creates a connection between two servers and sets its status.
///
/// # Panics
///
/// Panics if creation or the status change fails.
pub async fn connect(
    registry: &InMemoryRegistry,
    webview: &Server<Webview>,
    user_delivery: &Server<UserDelivery>,
    status: &str,
) -> Connection {
    let connection = registry
        .connections
        .create(pair_request(webview, user_delivery))
        .await
        .expect("connection should be created");
    registry
        .connections
        .set_status(connection.id(), status)
        .await
        .expect("connection status should be set")
}
