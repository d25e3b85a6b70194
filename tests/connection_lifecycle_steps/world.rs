//! Shared world state for connection lifecycle BDD scenarios.

use std::collections::HashMap;

use notiflink::bootstrap::InMemoryRegistry;
use notiflink::config::Config;
use notiflink::connection::{domain::Connection, services::ConnectionServiceError};
use notiflink::server::domain::{Server, UserDelivery, Webview};
use rstest::fixture;

/// Scenario world for connection lifecycle behaviour tests.
pub struct LifecycleWorld {
    /// The wired in-memory registry under test.
    pub registry: InMemoryRegistry,
    /// Webview servers created by the scenario, keyed by name.
    pub webview_servers: HashMap<String, Server<Webview>>,
    /// User-delivery servers created by the scenario, keyed by name.
    pub user_delivery_servers: HashMap<String, Server<UserDelivery>>,
    /// Connections created by the scenario, keyed by `(webview, user delivery)` names.
    pub connections: HashMap<(String, String), Connection>,
    /// Result of the last connection request.
    pub last_result: Option<Result<Connection, ConnectionServiceError>>,
}

impl LifecycleWorld {
    /// Creates a world backed by an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: InMemoryRegistry::in_memory(&Config::default()),
            webview_servers: HashMap::new(),
            user_delivery_servers: HashMap::new(),
            connections: HashMap::new(),
            last_result: None,
        }
    }

    /// Looks up a webview server created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if no webview server has that name.
    pub fn webview(&self, name: &str) -> Result<&Server<Webview>, eyre::Report> {
        self.webview_servers
            .get(name)
            .ok_or_else(|| eyre::eyre!("no webview server named '{name}' in scenario world"))
    }

    /// Looks up a user-delivery server created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if no user-delivery server has that name.
    pub fn user_delivery(&self, name: &str) -> Result<&Server<UserDelivery>, eyre::Report> {
        self.user_delivery_servers
            .get(name)
            .ok_or_else(|| eyre::eyre!("no user delivery server named '{name}' in scenario world"))
    }

    /// Looks up a connection created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair was never connected.
    pub fn connection(
        &self,
        webview: &str,
        user_delivery: &str,
    ) -> Result<&Connection, eyre::Report> {
        self.connections
            .get(&(webview.to_owned(), user_delivery.to_owned()))
            .ok_or_else(|| eyre::eyre!("no connection between '{webview}' and '{user_delivery}'"))
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
